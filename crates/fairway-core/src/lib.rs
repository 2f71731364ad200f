//! Fairway Core — shared saga-layer abstractions.
//!
//! This crate defines the envelope and topic vocabulary, the operation
//! result container, the error taxonomy, and the collaborator contracts
//! (bus, clock, repository) that every saga crate depends on. It contains
//! no transport or persistence code.

pub mod bus;
pub mod clock;
pub mod domain;
pub mod envelope;
pub mod error;
pub mod outcome;
pub mod repository;
pub mod topics;
