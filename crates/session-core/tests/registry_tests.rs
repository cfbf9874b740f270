//! Integration tests for the local session registry

use std::sync::Arc;
use std::time::Duration;

use arcade_session_core::{
    BuiltinGames, ExitReason, Game, GameInput, GameKind, GameRejection, GameStatus,
    LocalSessionRegistry, PlayerId, RegistryConfig, RegistryError, SessionError, SessionId,
    SessionRegistry,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use tokio::time::timeout;

/// Game that panics on its first input
struct FragileGame;

impl Game for FragileGame {
    fn add_player(&mut self, _player: PlayerId) -> Result<(), GameRejection> {
        Ok(())
    }

    fn remove_player(&mut self, _player: &PlayerId) -> Result<(), GameRejection> {
        Ok(())
    }

    fn status(&self) -> GameStatus {
        GameStatus::default()
    }

    fn start_if_ready(&mut self) -> bool {
        false
    }

    fn handle_input(&mut self, _player: &PlayerId, _input: GameInput) {
        panic!("fragile game broke");
    }
}

fn id(value: &str) -> SessionId {
    SessionId::parse(value).unwrap()
}

fn builtin_registry() -> LocalSessionRegistry {
    let config = RegistryConfig {
        call_timeout: Duration::from_secs(1),
        ..Default::default()
    };
    LocalSessionRegistry::new(config, Arc::new(BuiltinGames::new()))
}

fn fragile_registry() -> LocalSessionRegistry {
    let factory = |kind: &GameKind| -> Result<Box<dyn Game>, RegistryError> {
        match kind.as_str() {
            "fragile" => Ok(Box::new(FragileGame)),
            _ => Err(RegistryError::UnknownKind { kind: kind.clone() }),
        }
    };
    LocalSessionRegistry::new(RegistryConfig::default(), Arc::new(factory))
}

#[tokio::test]
async fn test_spawn_resolve_and_stop() {
    let registry = builtin_registry();

    let handle = registry.spawn(id("abcdef"), "duel".into()).await.unwrap();
    assert_eq!(registry.live_count(), 1);
    assert_eq!(registry.list_sessions(), vec![id("abcdef")]);

    let resolved = registry.resolve(&id("abcdef")).await.unwrap();
    assert_eq!(resolved, handle);

    handle.add_player("alice".into()).await.unwrap();
    let status = resolved.status().await.unwrap();
    assert_eq!(status.players, vec![PlayerId::from("alice")]);

    assert!(registry.stop(&id("abcdef")).await);
    assert!(!registry.stop(&id("abcdef")).await);
    assert_eq!(registry.live_count(), 0);
    assert_eq!(
        registry.resolve(&id("abcdef")).await.unwrap_err(),
        RegistryError::NotFound { session_id: id("abcdef") }
    );
}

#[tokio::test]
async fn test_stopped_session_becomes_unavailable() {
    let registry = builtin_registry();
    let handle = registry.spawn(id("stopme"), "party".into()).await.unwrap();

    registry.stop(&id("stopme")).await;

    // The abort is observed once the actor task is polled again.
    let err = timeout(Duration::from_secs(1), async {
        loop {
            match handle.status().await {
                Err(e) => break e,
                Ok(_) => tokio::task::yield_now().await,
            }
        }
    })
    .await
    .unwrap();
    assert_eq!(err, SessionError::Unavailable { session_id: id("stopme") });
}

#[tokio::test]
async fn test_live_id_cannot_be_reused() {
    let registry = builtin_registry();
    let first = registry.spawn(id("takenn"), "duel".into()).await.unwrap();
    let err = registry.spawn(id("takenn"), "party".into()).await.unwrap_err();
    assert_eq!(err, RegistryError::IdInUse { session_id: id("takenn") });

    registry.stop(&id("takenn")).await;
    let second = registry.spawn(id("takenn"), "party".into()).await.unwrap();
    assert_ne!(first, second);
    assert!(second.instance() > first.instance());
}

#[tokio::test]
async fn test_unknown_kind_registers_nothing() {
    let registry = builtin_registry();
    let err = registry.spawn(id("chessy"), "chess".into()).await.unwrap_err();

    assert_eq!(err, RegistryError::UnknownKind { kind: "chess".into() });
    assert_eq!(registry.live_count(), 0);
    assert_eq!(registry.stats().total_created, 0);
}

#[tokio::test]
async fn test_stop_broadcasts_exit() {
    let registry = builtin_registry();
    let mut exits = registry.subscribe_exits();

    let handle = registry.spawn(id("exitss"), "duel".into()).await.unwrap();
    registry.stop(&id("exitss")).await;

    let exit = timeout(Duration::from_secs(1), exits.recv()).await.unwrap().unwrap();
    assert_eq!(exit.session_id, id("exitss"));
    assert_eq!(exit.instance, handle.instance());
    assert_eq!(exit.reason, ExitReason::Stopped);

    // the monitor must not report the aborted actor a second time
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(exits.try_recv().is_err());
}

#[tokio::test]
async fn test_panicking_game_is_reported_as_crash() {
    let registry = fragile_registry();
    let mut exits = registry.subscribe_exits();

    let handle = registry.spawn(id("boomer"), "fragile".into()).await.unwrap();
    handle.handle_input("alice".into(), GameInput(json!({"press": "a"})));

    let exit = timeout(Duration::from_secs(1), exits.recv()).await.unwrap().unwrap();
    assert_eq!(exit.session_id, id("boomer"));
    assert_eq!(exit.reason, ExitReason::Crashed("fragile game broke".to_string()));

    assert_eq!(registry.live_count(), 0);
    assert!(registry.resolve(&id("boomer")).await.is_err());

    let stats = registry.stats();
    assert_eq!(stats.total_created, 1);
    assert_eq!(stats.total_crashed, 1);
    assert_eq!(stats.total_stopped, 0);
}

#[tokio::test]
async fn test_shutdown_stops_everything() {
    let registry = builtin_registry();
    for session in ["aaaaaa", "bbbbbb", "cccccc"] {
        registry.spawn(id(session), "party".into()).await.unwrap();
    }
    assert_eq!(registry.live_count(), 3);

    registry.shutdown();

    let stats = registry.stats();
    assert_eq!(stats.live, 0);
    assert_eq!(stats.total_created, 3);
    assert_eq!(stats.total_stopped, 3);
}
