//! Domain layer for the round lifecycle saga.

pub mod events;
pub mod schedule;
