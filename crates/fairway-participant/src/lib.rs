//! Fairway — Participant Join saga.
//!
//! RSVP handling for rounds, including the fire-and-forget round-trip to the
//! external ranking service: the first hop publishes a tag lookup request
//! carrying all resumption context, and a second, independently-arriving
//! envelope resumes the join.

pub mod application;
pub mod domain;
