//! Domain layer for the participant join saga.

pub mod events;
