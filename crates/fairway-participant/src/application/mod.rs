//! Application layer for the participant join saga.

pub mod handlers;
pub mod service;
