//! Message envelope and handler result types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// String-keyed metadata carried alongside every payload.
pub type Metadata = BTreeMap<String, String>;

/// Metadata key under which the presentation message reference travels.
pub const EVENT_MESSAGE_ID_KEY: &str = "event_message_id";

/// A message on the bus: topic, JSON payload, correlation id, and metadata.
///
/// The correlation id is opaque and propagated unchanged across every hop of
/// a saga; metadata carries cross-cutting fields such as the presentation
/// message reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    /// Topic the envelope is addressed to.
    pub topic: String,
    /// Versioned structured payload.
    pub payload: serde_json::Value,
    /// Opaque correlation id, propagated end-to-end.
    pub correlation_id: String,
    /// Cross-cutting string metadata.
    #[serde(default)]
    pub metadata: Metadata,
}

impl Envelope {
    /// Creates an envelope with empty metadata.
    #[must_use]
    pub fn new(
        topic: impl Into<String>,
        payload: serde_json::Value,
        correlation_id: impl Into<String>,
    ) -> Self {
        Self {
            topic: topic.into(),
            payload,
            correlation_id: correlation_id.into(),
            metadata: Metadata::new(),
        }
    }

    /// Adds a metadata entry, returning the envelope.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// The inbound side of a handler invocation: correlation id and metadata of
/// the envelope being processed. Handlers read cross-cutting fields from
/// here; they never see the raw envelope.
#[derive(Debug, Clone, Default)]
pub struct HandlerContext {
    /// Correlation id of the inbound envelope.
    pub correlation_id: String,
    /// Metadata of the inbound envelope.
    pub metadata: Metadata,
}

impl HandlerContext {
    /// Builds a context from an inbound envelope.
    #[must_use]
    pub fn from_envelope(envelope: &Envelope) -> Self {
        Self {
            correlation_id: envelope.correlation_id.clone(),
            metadata: envelope.metadata.clone(),
        }
    }

    /// The presentation message reference, if the inbound envelope carried one.
    #[must_use]
    pub fn event_message_id(&self) -> Option<&str> {
        self.metadata.get(EVENT_MESSAGE_ID_KEY).map(String::as_str)
    }
}

/// One outgoing topic+payload pair returned by a handler.
///
/// The dispatcher turns each result into an envelope that copies the inbound
/// correlation id and merges metadata (result entries win). A result with
/// `guild_scope` set is additionally published to the guild-scoped variant of
/// its topic.
#[derive(Debug, Clone)]
pub struct HandlerResult {
    /// Topic to publish to.
    pub topic: String,
    /// Serialized payload.
    pub payload: serde_json::Value,
    /// Metadata to merge onto the outgoing envelope.
    pub metadata: Metadata,
    /// When set, the result is dual-published to `topic.<guild_id>` as well.
    pub guild_scope: Option<String>,
}

impl HandlerResult {
    /// Creates a result for `topic` carrying `payload`.
    #[must_use]
    pub fn new<P: Serialize>(topic: impl Into<String>, payload: &P) -> Self {
        Self {
            topic: topic.into(),
            // Serialization of derived Serialize types to Value is infallible.
            payload: serde_json::to_value(payload).expect("payload serialization is infallible"),
            metadata: Metadata::new(),
            guild_scope: None,
        }
    }

    /// Adds a metadata entry, returning the result.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Opts the result into tenant fan-out for `guild_id`.
    #[must_use]
    pub fn guild_scoped(mut self, guild_id: impl Into<String>) -> Self {
        self.guild_scope = Some(guild_id.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use serde::Serialize;

    use super::{Envelope, HandlerContext, HandlerResult, EVENT_MESSAGE_ID_KEY};

    #[derive(Serialize)]
    struct Dummy {
        value: u32,
    }

    #[test]
    fn test_handler_context_exposes_event_message_id() {
        let envelope = Envelope::new("round.delete.requested.v1", serde_json::json!({}), "corr-1")
            .with_metadata(EVENT_MESSAGE_ID_KEY, "msg-42");

        let ctx = HandlerContext::from_envelope(&envelope);

        assert_eq!(ctx.correlation_id, "corr-1");
        assert_eq!(ctx.event_message_id(), Some("msg-42"));
    }

    #[test]
    fn test_handler_result_builders_compose() {
        let result = HandlerResult::new("round.creation.completed.v1", &Dummy { value: 7 })
            .with_metadata("k", "v")
            .guild_scoped("guild-1");

        assert_eq!(result.payload, serde_json::json!({ "value": 7 }));
        assert_eq!(result.metadata.get("k").map(String::as_str), Some("v"));
        assert_eq!(result.guild_scope.as_deref(), Some("guild-1"));
    }
}
