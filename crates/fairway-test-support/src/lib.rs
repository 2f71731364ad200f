//! Shared test mocks and utilities for the Fairway saga layer.

mod bus;
mod clock;
mod repository;

pub use bus::{FailingBus, RecordingBus};
pub use clock::FixedClock;
pub use repository::{
    FailingRoundRepository, InMemoryImportJobRepository, InMemoryRoundRepository,
};
