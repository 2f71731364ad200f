//! Event bus contract and tenant fan-out.

use async_trait::async_trait;

use crate::envelope::Envelope;
use crate::error::PublishError;
use crate::topics;

/// Publisher side of the message broker. Implementations are injected at
/// construction; the saga layer holds no process-wide bus state.
#[async_trait]
pub trait EventBus: Send + Sync {
    /// Publishes one envelope to its topic.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::Transport`] on broker faults.
    async fn publish(&self, envelope: Envelope) -> Result<(), PublishError>;
}

/// Publishes `envelope` to `base_topic` and to its guild-scoped variant, so
/// legacy and guild-scoped subscribers both receive the payload during the
/// migration window.
///
/// # Errors
///
/// Returns [`PublishError::MissingGuildId`] when `guild_id` is empty; no
/// publish is attempted. Transport errors propagate from the bus.
pub async fn publish_guild_scoped(
    bus: &dyn EventBus,
    base_topic: &str,
    guild_id: &str,
    envelope: &Envelope,
) -> Result<(), PublishError> {
    if guild_id.is_empty() {
        return Err(PublishError::MissingGuildId);
    }

    let mut legacy = envelope.clone();
    legacy.topic = base_topic.to_owned();
    bus.publish(legacy).await?;

    let mut scoped = envelope.clone();
    scoped.topic = topics::guild_scoped(base_topic, guild_id);
    bus.publish(scoped).await
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::{publish_guild_scoped, EventBus};
    use crate::envelope::Envelope;
    use crate::error::PublishError;

    #[derive(Default)]
    struct CountingBus {
        published: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl EventBus for CountingBus {
        async fn publish(&self, envelope: Envelope) -> Result<(), PublishError> {
            self.published.lock().unwrap().push(envelope.topic);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_dual_publishes_legacy_and_scoped_topics() {
        let bus = CountingBus::default();
        let envelope = Envelope::new("round.participant.joined.v1", serde_json::json!({}), "c1");

        publish_guild_scoped(&bus, "round.participant.joined.v1", "g9", &envelope)
            .await
            .unwrap();

        let topics = bus.published.lock().unwrap().clone();
        assert_eq!(
            topics,
            vec![
                "round.participant.joined.v1".to_owned(),
                "round.participant.joined.v1.g9".to_owned(),
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_guild_id_fails_fast_without_publishing() {
        let bus = CountingBus::default();
        let envelope = Envelope::new("round.participant.joined.v1", serde_json::json!({}), "c1");

        let err = publish_guild_scoped(&bus, "round.participant.joined.v1", "", &envelope)
            .await
            .unwrap_err();

        assert!(matches!(err, PublishError::MissingGuildId));
        assert!(bus.published.lock().unwrap().is_empty());
    }
}
