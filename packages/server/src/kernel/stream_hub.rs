//! In-process fan-out for the realtime feeds.
//!
//! One broadcast channel per topic, created on first subscription. Domains
//! publish typed events; SSE handlers subscribe by topic and forward them.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{broadcast, RwLock};
use tracing::warn;

/// Topic carrying every newly created notification
pub const NOTIFICATIONS_TOPIC: &str = "notifications";

const TOPIC_BUFFER: usize = 256;

/// Envelope sent to subscribers, serialized as `{"type": ..., "data": ...}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreamEvent {
    #[serde(rename = "type")]
    pub kind: String,
    pub data: serde_json::Value,
}

#[derive(Clone, Default)]
pub struct StreamHub {
    topics: Arc<RwLock<HashMap<String, broadcast::Sender<StreamEvent>>>>,
}

impl StreamHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize `payload` and send it to the topic's current subscribers.
    /// Topics nobody listens to are skipped.
    pub async fn publish_event<T: Serialize>(&self, topic: &str, kind: &str, payload: &T) {
        let data = match serde_json::to_value(payload) {
            Ok(data) => data,
            Err(e) => {
                warn!(error = %e, topic, kind, "Stream event not serializable");
                return;
            }
        };

        let topics = self.topics.read().await;
        if let Some(sender) = topics.get(topic) {
            // Err only means every receiver has gone away
            let _ = sender.send(StreamEvent {
                kind: kind.to_string(),
                data,
            });
        }
    }

    pub async fn subscribe(&self, topic: &str) -> broadcast::Receiver<StreamEvent> {
        let mut topics = self.topics.write().await;
        topics
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(TOPIC_BUFFER).0)
            .subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_subscribers_receive_wrapped_payload() {
        let hub = StreamHub::new();
        let mut first = hub.subscribe(NOTIFICATIONS_TOPIC).await;
        let mut second = hub.subscribe(NOTIFICATIONS_TOPIC).await;

        hub.publish_event(
            NOTIFICATIONS_TOPIC,
            "notification_created",
            &json!({"title": "Capacité dépassée"}),
        )
        .await;

        for rx in [&mut first, &mut second] {
            let event = rx.recv().await.unwrap();
            assert_eq!(event.kind, "notification_created");
            assert_eq!(event.data["title"], "Capacité dépassée");
        }
    }

    #[tokio::test]
    async fn test_unsubscribed_topic_is_skipped() {
        let hub = StreamHub::new();
        hub.publish_event("nobody", "noop", &json!({})).await;
        assert!(hub.topics.read().await.is_empty());
    }

    #[test]
    fn test_event_wire_shape() {
        let event = StreamEvent {
            kind: "notification_created".into(),
            data: json!({"id": 1}),
        };
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({"type": "notification_created", "data": {"id": 1}})
        );
    }
}
