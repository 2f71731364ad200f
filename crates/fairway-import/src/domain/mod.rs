//! Domain layer for the import pipeline.

pub mod events;
