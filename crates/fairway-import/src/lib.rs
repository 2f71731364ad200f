//! Scorecard import pipeline: a chain of producers that ends at the same
//! completeness check the score saga uses, not a separate state machine.

pub mod application;
pub mod domain;
pub mod parser;
