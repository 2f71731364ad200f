//! Application layer for the import pipeline.

pub mod handlers;
pub mod service;
