//! Application layer for the score saga.

pub mod handlers;
pub mod service;
