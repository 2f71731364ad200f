//! Topic-to-handler routing.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

use fairway_core::bus::{publish_guild_scoped, EventBus};
use fairway_core::envelope::{Envelope, HandlerContext, HandlerResult};
use fairway_core::error::{HandlerError, PublishError};

type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

type RouteFn =
    Box<dyn Fn(HandlerContext, serde_json::Value) -> BoxFuture<Result<Vec<HandlerResult>, RouteError>> + Send + Sync>;

enum RouteError {
    Decode(serde_json::Error),
    Handler(HandlerError),
}

/// Error returned from [`Dispatcher::dispatch`]. The caller must leave the
/// inbound message unacknowledged so the bus redelivers it.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The handler's collaborating call faulted or its result violated the
    /// operation-result contract.
    #[error("handler failed: {0}")]
    Handler(#[from] HandlerError),

    /// Publishing a result envelope failed.
    #[error("publish failed: {0}")]
    Publish(#[from] PublishError),
}

/// Outcome of a successfully processed envelope; either way the inbound
/// message may be acknowledged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchReceipt {
    /// The handler ran; this many envelopes were published.
    Published(usize),
    /// The envelope was terminal garbage (unknown topic or undecodable
    /// payload) and was dropped. Redelivery cannot help.
    Dropped,
}

/// Routes envelopes to registered handlers by topic.
///
/// Each handler declares its payload type; the dispatcher decodes the inbound
/// payload, invokes the handler with the envelope's context, and turns every
/// returned [`HandlerResult`] into an outgoing envelope that copies the
/// inbound correlation id and merges metadata (result entries win). Exactly
/// the returned results are published, nothing implicit.
pub struct Dispatcher {
    routes: HashMap<String, RouteFn>,
    bus: Arc<dyn EventBus>,
}

impl Dispatcher {
    /// Creates a dispatcher publishing to `bus`.
    #[must_use]
    pub fn new(bus: Arc<dyn EventBus>) -> Self {
        Self {
            routes: HashMap::new(),
            bus,
        }
    }

    /// Registers `handler` for `topic`, replacing any previous registration.
    pub fn on<P, F, Fut>(&mut self, topic: &str, handler: F)
    where
        P: DeserializeOwned + Send + 'static,
        F: Fn(HandlerContext, P) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Vec<HandlerResult>, HandlerError>> + Send + 'static,
    {
        let route: RouteFn = Box::new(move |ctx, value| match serde_json::from_value::<P>(value) {
            Ok(payload) => {
                let fut = handler(ctx, payload);
                Box::pin(async move { fut.await.map_err(RouteError::Handler) })
            }
            Err(e) => Box::pin(async move { Err(RouteError::Decode(e)) }),
        });
        self.routes.insert(topic.to_owned(), route);
    }

    /// Processes one inbound envelope.
    ///
    /// Decode failures and unknown topics are terminal: logged and dropped,
    /// never retried. A handler error is never published as an event; it
    /// propagates so the caller can leave the message for redelivery.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] when the handler or a publish faulted; the
    /// inbound message must then be redelivered.
    pub async fn dispatch(&self, envelope: Envelope) -> Result<DispatchReceipt, DispatchError> {
        let Some(route) = self.routes.get(&envelope.topic) else {
            warn!(topic = %envelope.topic, "no handler registered, dropping envelope");
            return Ok(DispatchReceipt::Dropped);
        };

        let ctx = HandlerContext::from_envelope(&envelope);
        let results = match route(ctx, envelope.payload.clone()).await {
            Ok(results) => results,
            Err(RouteError::Decode(e)) => {
                warn!(
                    topic = %envelope.topic,
                    correlation_id = %envelope.correlation_id,
                    error = %e,
                    "undecodable payload, dropping envelope"
                );
                return Ok(DispatchReceipt::Dropped);
            }
            Err(RouteError::Handler(e)) => return Err(DispatchError::Handler(e)),
        };

        let mut published = 0;
        for result in results {
            let mut metadata = envelope.metadata.clone();
            metadata.extend(result.metadata);
            let outgoing = Envelope {
                topic: result.topic.clone(),
                payload: result.payload,
                correlation_id: envelope.correlation_id.clone(),
                metadata,
            };
            debug!(
                inbound = %envelope.topic,
                outbound = %outgoing.topic,
                correlation_id = %outgoing.correlation_id,
                "publishing saga result"
            );
            match result.guild_scope {
                Some(guild_id) => {
                    publish_guild_scoped(self.bus.as_ref(), &result.topic, &guild_id, &outgoing)
                        .await?;
                    published += 2;
                }
                None => {
                    self.bus.publish(outgoing).await?;
                    published += 1;
                }
            }
        }
        Ok(DispatchReceipt::Published(published))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde::{Deserialize, Serialize};

    use fairway_core::envelope::{Envelope, HandlerResult};
    use fairway_core::error::{HandlerError, ServiceError};
    use fairway_test_support::{FailingBus, RecordingBus};

    use super::{DispatchError, DispatchReceipt, Dispatcher};

    #[derive(Debug, Serialize, Deserialize)]
    struct Ping {
        value: u32,
    }

    #[derive(Debug, Serialize)]
    struct Pong {
        value: u32,
    }

    #[tokio::test]
    async fn test_dispatch_copies_correlation_id_and_merges_metadata() {
        // Arrange
        let bus = Arc::new(RecordingBus::new());
        let mut dispatcher = Dispatcher::new(bus.clone());
        dispatcher.on("ping.v1", |_ctx, payload: Ping| async move {
            Ok(vec![
                HandlerResult::new("pong.v1", &Pong { value: payload.value }).with_metadata("stage", "pong"),
            ])
        });
        let envelope = Envelope::new("ping.v1", serde_json::json!({ "value": 3 }), "corr-7")
            .with_metadata("stage", "ping")
            .with_metadata("origin", "test");

        // Act
        let receipt = dispatcher.dispatch(envelope).await.unwrap();

        // Assert
        assert_eq!(receipt, DispatchReceipt::Published(1));
        let published = bus.published();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].topic, "pong.v1");
        assert_eq!(published[0].correlation_id, "corr-7");
        assert_eq!(published[0].payload, serde_json::json!({ "value": 3 }));
        // Result metadata wins over inbound metadata; inbound extras survive.
        assert_eq!(published[0].metadata.get("stage").unwrap(), "pong");
        assert_eq!(published[0].metadata.get("origin").unwrap(), "test");
    }

    #[tokio::test]
    async fn test_decode_failure_is_dropped_without_publish() {
        // Arrange
        let bus = Arc::new(RecordingBus::new());
        let mut dispatcher = Dispatcher::new(bus.clone());
        dispatcher.on("ping.v1", |_ctx, _payload: Ping| async move {
            Ok(vec![HandlerResult::new("pong.v1", &Pong { value: 0 })])
        });
        let envelope = Envelope::new("ping.v1", serde_json::json!({ "value": "nan" }), "corr-1");

        // Act
        let receipt = dispatcher.dispatch(envelope).await.unwrap();

        // Assert
        assert_eq!(receipt, DispatchReceipt::Dropped);
        assert!(bus.published().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_topic_is_dropped() {
        let bus = Arc::new(RecordingBus::new());
        let dispatcher = Dispatcher::new(bus.clone());
        let envelope = Envelope::new("unregistered.v1", serde_json::json!({}), "corr-1");

        let receipt = dispatcher.dispatch(envelope).await.unwrap();

        assert_eq!(receipt, DispatchReceipt::Dropped);
        assert!(bus.published().is_empty());
    }

    #[tokio::test]
    async fn test_handler_error_publishes_nothing_and_propagates() {
        // Arrange
        let bus = Arc::new(RecordingBus::new());
        let mut dispatcher = Dispatcher::new(bus.clone());
        dispatcher.on("ping.v1", |_ctx, _payload: Ping| async move {
            Err::<Vec<HandlerResult>, _>(HandlerError::Service(ServiceError::Infrastructure(
                "db down".into(),
            )))
        });
        let envelope = Envelope::new("ping.v1", serde_json::json!({ "value": 1 }), "corr-1");

        // Act
        let result = dispatcher.dispatch(envelope).await;

        // Assert
        assert!(matches!(result, Err(DispatchError::Handler(_))));
        assert!(bus.published().is_empty());
    }

    #[tokio::test]
    async fn test_guild_scoped_result_is_dual_published() {
        // Arrange
        let bus = Arc::new(RecordingBus::new());
        let mut dispatcher = Dispatcher::new(bus.clone());
        dispatcher.on("ping.v1", |_ctx, payload: Ping| async move {
            Ok(vec![
                HandlerResult::new("pong.v1", &Pong { value: payload.value }).guild_scoped("g1"),
            ])
        });
        let envelope = Envelope::new("ping.v1", serde_json::json!({ "value": 9 }), "corr-2");

        // Act
        let receipt = dispatcher.dispatch(envelope).await.unwrap();

        // Assert
        assert_eq!(receipt, DispatchReceipt::Published(2));
        let topics: Vec<String> = bus.published().into_iter().map(|e| e.topic).collect();
        assert_eq!(topics, vec!["pong.v1".to_owned(), "pong.v1.g1".to_owned()]);
    }

    #[tokio::test]
    async fn test_publish_failure_propagates_for_redelivery() {
        // Arrange
        let mut dispatcher = Dispatcher::new(Arc::new(FailingBus));
        dispatcher.on("ping.v1", |_ctx, payload: Ping| async move {
            Ok(vec![HandlerResult::new("pong.v1", &Pong { value: payload.value })])
        });
        let envelope = Envelope::new("ping.v1", serde_json::json!({ "value": 5 }), "corr-9");

        // Act
        let result = dispatcher.dispatch(envelope).await;

        // Assert
        assert!(matches!(result, Err(DispatchError::Publish(_))));
    }

    #[tokio::test]
    async fn test_empty_result_list_publishes_nothing() {
        let bus = Arc::new(RecordingBus::new());
        let mut dispatcher = Dispatcher::new(bus.clone());
        dispatcher.on("ping.v1", |_ctx, _payload: Ping| async move { Ok(vec![]) });
        let envelope = Envelope::new("ping.v1", serde_json::json!({ "value": 1 }), "corr-3");

        let receipt = dispatcher.dispatch(envelope).await.unwrap();

        assert_eq!(receipt, DispatchReceipt::Published(0));
        assert!(bus.published().is_empty());
    }
}
