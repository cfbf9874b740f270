//! JSON-lines relay between stdin/stdout and the coordinator.
//!
//! Each stdin line is one request, e.g.
//! `{"op":"queue_game","kind":"duel","player":"alice"}`. Request/response
//! operations get one reply line; every published coordinator event is
//! written as an event line. Malformed lines are logged and skipped.

use arcade_coordinator::{CoordinatorError, CoordinatorEvent, CoordinatorHandle};
use arcade_session_core::{GameInput, GameKind, PlayerId, SessionId};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

/// Capacity of the channel feeding the stdout writer
const CHANNEL_CAPACITY: usize = 128;

/// One request read from stdin
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    QueueGame { kind: GameKind, player: PlayerId },
    JoinGame { id: SessionId, player: PlayerId },
    LeaveGame { id: SessionId, player: PlayerId },
    RouteInput { player: PlayerId, input: GameInput },
    TerminateGame { id: SessionId },
    Status,
}

impl Request {
    pub fn op(&self) -> &'static str {
        match self {
            Request::QueueGame { .. } => "queue_game",
            Request::JoinGame { .. } => "join_game",
            Request::LeaveGame { .. } => "leave_game",
            Request::RouteInput { .. } => "route_input",
            Request::TerminateGame { .. } => "terminate_game",
            Request::Status => "status",
        }
    }
}

/// Apply a request; returns the reply line for request/response operations
pub async fn dispatch(coordinator: &CoordinatorHandle, request: Request) -> Option<Value> {
    let op = request.op();
    let result = match request {
        Request::QueueGame { kind, player } => coordinator
            .queue_game(kind, player)
            .await
            .map(|id| json!({ "id": id })),
        Request::JoinGame { id, player } => {
            coordinator.join_game(&id, player).await.map(|()| json!({}))
        }
        Request::LeaveGame { id, player } => {
            coordinator.leave_game(&id, player).await.map(|()| json!({}))
        }
        Request::RouteInput { player, input } => {
            coordinator.route_input(player, input).await;
            return None;
        }
        Request::TerminateGame { id } => {
            coordinator.terminate_game(&id).await;
            return None;
        }
        Request::Status => coordinator.status().await.map(|status| json!({ "status": status })),
    };
    Some(reply(op, result))
}

fn reply(op: &str, result: Result<Value, CoordinatorError>) -> Value {
    let mut message = Map::new();
    message.insert("type".into(), "reply".into());
    message.insert("op".into(), op.into());
    match result {
        Ok(Value::Object(fields)) => {
            message.insert("ok".into(), true.into());
            message.extend(fields);
        }
        Ok(_) => {
            message.insert("ok".into(), true.into());
        }
        Err(e) => {
            message.insert("ok".into(), false.into());
            message.insert("error".into(), e.to_string().into());
        }
    }
    Value::Object(message)
}

fn event_message(event: &CoordinatorEvent) -> Value {
    json!({ "type": "event", "topic": event.topic(), "event": event })
}

/// Relay stdin to the coordinator until EOF, then shut the coordinator down
pub async fn run(coordinator: CoordinatorHandle) -> anyhow::Result<()> {
    let (outgoing_tx, mut outgoing_rx) = mpsc::channel::<Value>(CHANNEL_CAPACITY);

    // Task: forward published events.
    let events_handle = tokio::spawn({
        let mut events = coordinator.subscribe();
        let outgoing_tx = outgoing_tx.clone();
        async move {
            while let Ok(event) = events.receive().await {
                if outgoing_tx.send(event_message(&event)).await.is_err() {
                    break;
                }
            }
            debug!("event forwarder finished");
        }
    });

    // Task: write outgoing lines to stdout.
    let stdout_writer_handle = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(message) = outgoing_rx.recv().await {
            let line = format!("{message}\n");
            if let Err(e) = stdout.write_all(line.as_bytes()).await {
                error!("Failed to write to stdout: {e}");
                break;
            }
            if let Err(e) = stdout.flush().await {
                error!("Failed to flush stdout: {e}");
                break;
            }
        }
        debug!("stdout writer finished");
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<Request>(&line) {
            Ok(request) => {
                if let Some(reply) = dispatch(&coordinator, request).await {
                    if outgoing_tx.send(reply).await.is_err() {
                        break;
                    }
                }
            }
            Err(e) => warn!("Skipping malformed request: {e}"),
        }
    }
    debug!("stdin reader finished (EOF)");

    coordinator.shutdown().await?;
    // The forwarder ends once every event sender is gone.
    drop(coordinator);
    drop(outgoing_tx);
    let _ = tokio::join!(events_handle, stdout_writer_handle);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use arcade_coordinator::{Coordinator, CoordinatorConfig};
    use arcade_session_core::LocalSessionRegistry;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    #[test]
    fn test_parse_requests() {
        let request: Request =
            serde_json::from_str(r#"{"op":"queue_game","kind":"duel","player":"alice"}"#).unwrap();
        assert_eq!(
            request,
            Request::QueueGame { kind: "duel".into(), player: "alice".into() }
        );

        let line = r#"{"op":"route_input","player":"bob","input":{"key":"up"}}"#;
        let request: Request = serde_json::from_str(line).unwrap();
        assert_eq!(request.op(), "route_input");

        let request: Request = serde_json::from_str(r#"{"op":"status"}"#).unwrap();
        assert_eq!(request, Request::Status);
    }

    #[test]
    fn test_malformed_requests_are_rejected() {
        assert!(serde_json::from_str::<Request>(r#"{"op":"dance"}"#).is_err());
        let bad_id = r#"{"op":"terminate_game","id":"TOOLONG"}"#;
        assert!(serde_json::from_str::<Request>(bad_id).is_err());
        assert!(serde_json::from_str::<Request>("not json").is_err());
    }

    #[test]
    fn test_reply_shapes() {
        let ok = reply("queue_game", Ok(json!({"id": "abcdef"})));
        assert_eq!(ok, json!({"type": "reply", "op": "queue_game", "ok": true, "id": "abcdef"}));

        let err = reply("join_game", Err(CoordinatorError::Unavailable));
        assert_eq!(
            err,
            json!({
                "type": "reply",
                "op": "join_game",
                "ok": false,
                "error": "Coordinator is not running"
            })
        );
    }

    #[test]
    fn test_event_message_carries_topic() {
        let event = CoordinatorEvent::GameTerminated(SessionId::parse("abcdef").unwrap());
        assert_eq!(
            event_message(&event),
            json!({
                "type": "event",
                "topic": "coordinator:status",
                "event": {"event": "game_terminated", "data": "abcdef"}
            })
        );
    }

    #[tokio::test]
    async fn test_dispatch_against_coordinator() {
        let config = CoordinatorConfig::default();
        let registry = Arc::new(LocalSessionRegistry::new(
            config.registry_config(),
            Arc::new(config.game_factory()),
        ));
        let (coordinator, _task) = Coordinator::new(config, registry).spawn();

        let queued = dispatch(
            &coordinator,
            Request::QueueGame { kind: "duel".into(), player: "alice".into() },
        )
        .await
        .unwrap();
        assert_eq!(queued["ok"], true);
        let id = SessionId::parse(queued["id"].as_str().unwrap()).unwrap();

        let rejoin = Request::JoinGame { id: id.clone(), player: "alice".into() };
        let joined = dispatch(&coordinator, rejoin).await.unwrap();
        assert_eq!(joined["ok"], false);
        assert!(joined["error"].as_str().unwrap().contains("already joined"));

        assert!(dispatch(&coordinator, Request::TerminateGame { id }).await.is_none());
        let status = dispatch(&coordinator, Request::Status).await.unwrap();
        assert_eq!(status["status"], json!({"active": null, "backlog": []}));
    }
}
