//! Domain layer for the score saga.

pub mod events;
