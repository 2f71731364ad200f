//! Test buses — `EventBus` implementations for tests.

use std::sync::Mutex;

use async_trait::async_trait;
use fairway_core::bus::EventBus;
use fairway_core::envelope::Envelope;
use fairway_core::error::PublishError;

/// A bus that records every published envelope.
#[derive(Debug, Default)]
pub struct RecordingBus {
    published: Mutex<Vec<Envelope>>,
}

impl RecordingBus {
    /// Creates an empty recording bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all published envelopes.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn published(&self) -> Vec<Envelope> {
        self.published.lock().unwrap().clone()
    }

    /// Removes and returns all published envelopes, oldest first.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn drain(&self) -> Vec<Envelope> {
        std::mem::take(&mut *self.published.lock().unwrap())
    }
}

#[async_trait]
impl EventBus for RecordingBus {
    async fn publish(&self, envelope: Envelope) -> Result<(), PublishError> {
        self.published.lock().unwrap().push(envelope);
        Ok(())
    }
}

/// A bus that always returns a transport error. Useful for testing
/// publish-failure paths.
#[derive(Debug)]
pub struct FailingBus;

#[async_trait]
impl EventBus for FailingBus {
    async fn publish(&self, _envelope: Envelope) -> Result<(), PublishError> {
        Err(PublishError::Transport("connection refused".into()))
    }
}
