//! Application layer for the round lifecycle saga.

pub mod handlers;
pub mod service;
