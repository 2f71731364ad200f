//! Fairway — Round Lifecycle saga.
//!
//! Create, update, delete, start, and finalize transitions for a round,
//! expressed as stateless handlers over the round service.

pub mod application;
pub mod domain;
