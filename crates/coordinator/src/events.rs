//! Coordinator Event System
//!
//! Events are published on a `tokio::sync::broadcast` channel scoped to the
//! [`COORDINATOR_TOPIC`]. Publishing never fails back to the operation that
//! triggered it: an event with no subscribers is simply dropped.

use arcade_session_core::SessionId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::errors::{CoordinatorError, Result};
use crate::status::CoordinatorStatus;

/// Topic all coordinator events are published under
pub const COORDINATOR_TOPIC: &str = "coordinator:status";

/// Events published by the coordinator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum CoordinatorEvent {
    /// Fresh snapshot, published at the end of every mutating operation
    CoordinatorUpdate(CoordinatorStatus),

    /// A scheduled session was terminated or went away. Always precedes the
    /// snapshot of the operation that removed it.
    GameTerminated(SessionId),
}

impl CoordinatorEvent {
    pub fn topic(&self) -> &'static str {
        COORDINATOR_TOPIC
    }
}

/// Receives coordinator events
pub struct CoordinatorEventSubscriber {
    receiver: broadcast::Receiver<CoordinatorEvent>,
}

impl CoordinatorEventSubscriber {
    pub fn new(receiver: broadcast::Receiver<CoordinatorEvent>) -> Self {
        Self { receiver }
    }

    /// Receive the next event. Events missed by a lagging subscriber are
    /// skipped.
    pub async fn receive(&mut self) -> Result<CoordinatorEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Ok(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(
                        "Coordinator event subscriber lagged, skipped {} events",
                        skipped
                    );
                }
                Err(broadcast::error::RecvError::Closed) => {
                    return Err(CoordinatorError::Unavailable)
                }
            }
        }
    }

    /// Try to receive an event without blocking
    pub fn try_receive(&mut self) -> Result<Option<CoordinatorEvent>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => return Ok(Some(event)),
                Err(broadcast::error::TryRecvError::Empty) => return Ok(None),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(
                        "Coordinator event subscriber lagged, skipped {} events",
                        skipped
                    );
                }
                Err(broadcast::error::TryRecvError::Closed) => {
                    return Err(CoordinatorError::Unavailable)
                }
            }
        }
    }
}

/// Publishes coordinator events to every subscriber
#[derive(Clone)]
pub struct CoordinatorEventProcessor {
    sender: broadcast::Sender<CoordinatorEvent>,
}

impl CoordinatorEventProcessor {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish an event; returns the number of subscribers that will see it
    pub fn publish(&self, event: CoordinatorEvent) -> usize {
        match &event {
            CoordinatorEvent::CoordinatorUpdate(status) => tracing::debug!(
                topic = COORDINATOR_TOPIC,
                "Coordinator update: active={:?} backlog={:?}",
                status.active_id(),
                status.backlog_ids()
            ),
            CoordinatorEvent::GameTerminated(id) => {
                tracing::info!(topic = COORDINATOR_TOPIC, "Game {} terminated", id)
            }
        }
        self.sender.send(event).unwrap_or(0)
    }

    pub fn subscribe(&self) -> CoordinatorEventSubscriber {
        CoordinatorEventSubscriber::new(self.sender.subscribe())
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for CoordinatorEventProcessor {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl std::fmt::Debug for CoordinatorEventProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoordinatorEventProcessor")
            .field("subscribers", &self.sender.receiver_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terminated(id: &str) -> CoordinatorEvent {
        CoordinatorEvent::GameTerminated(SessionId::parse(id).unwrap())
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_fine() {
        let events = CoordinatorEventProcessor::new(4);
        assert_eq!(events.publish(terminated("abcdef")), 0);
    }

    #[tokio::test]
    async fn test_subscribers_receive_in_order() {
        let events = CoordinatorEventProcessor::new(8);
        let mut subscriber = events.subscribe();

        events.publish(terminated("aaaaaa"));
        events.publish(CoordinatorEvent::CoordinatorUpdate(CoordinatorStatus::default()));

        assert_eq!(subscriber.receive().await.unwrap(), terminated("aaaaaa"));
        assert!(matches!(
            subscriber.receive().await.unwrap(),
            CoordinatorEvent::CoordinatorUpdate(status) if status.is_idle()
        ));
        assert_eq!(subscriber.try_receive().unwrap(), None);
    }

    #[tokio::test]
    async fn test_lagging_subscriber_skips_missed_events() {
        let events = CoordinatorEventProcessor::new(2);
        let mut subscriber = events.subscribe();

        for id in ["aaaaaa", "bbbbbb", "cccccc", "dddddd"] {
            events.publish(terminated(id));
        }

        assert_eq!(subscriber.try_receive().unwrap(), Some(terminated("cccccc")));
        assert_eq!(subscriber.receive().await.unwrap(), terminated("dddddd"));
    }

    #[tokio::test]
    async fn test_closed_channel_is_unavailable() {
        let events = CoordinatorEventProcessor::new(2);
        let mut subscriber = events.subscribe();
        drop(events);
        assert_eq!(subscriber.receive().await.unwrap_err(), CoordinatorError::Unavailable);
    }

    #[test]
    fn test_event_json_shape() {
        let json = serde_json::to_value(terminated("qwerty")).unwrap();
        assert_eq!(json, serde_json::json!({"event": "game_terminated", "data": "qwerty"}));

        let json = serde_json::to_value(CoordinatorEvent::CoordinatorUpdate(
            CoordinatorStatus::default(),
        ))
        .unwrap();
        assert_eq!(json["event"], "coordinator_update");
        assert_eq!(json["data"]["backlog"], serde_json::json!([]));
        assert_eq!(terminated("qwerty").topic(), "coordinator:status");
    }
}
