//! Session Registry
//!
//! Maps session identifiers to live [`SessionHandle`]s and owns session
//! lifetime: it spawns sessions, stops them, and reports every session that
//! goes away on a broadcast channel.

mod local;

pub use local::{LocalSessionRegistry, RegistryStats};

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::errors::RegistryError;
use crate::session::SessionHandle;
use crate::types::{GameKind, SessionId};

/// Why a session left the registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "detail", rename_all = "snake_case")]
pub enum ExitReason {
    /// Stopped through [`SessionRegistry::stop`]
    Stopped,
    /// The actor finished on its own
    Completed,
    /// The game panicked
    Crashed(String),
}

/// Notification that a session is no longer live
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionExit {
    pub session_id: SessionId,
    /// Instance number of the handle that went away
    pub instance: u64,
    pub reason: ExitReason,
}

/// Settings applied to every session a registry spawns
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Upper bound for every request/response call made through a handle
    pub call_timeout: Duration,
    /// Capacity of each session's mailbox
    pub mailbox_capacity: usize,
    /// Capacity of the exit notification channel
    pub exit_channel_capacity: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            call_timeout: Duration::from_secs(5),
            mailbox_capacity: 64,
            exit_channel_capacity: 256,
        }
    }
}

/// Spawns, resolves and stops sessions
#[async_trait]
pub trait SessionRegistry: Send + Sync {
    /// Start a new session of `kind` under `id`.
    ///
    /// Fails with [`RegistryError::IdInUse`] if a live session already has
    /// this identifier.
    async fn spawn(&self, id: SessionId, kind: GameKind) -> Result<SessionHandle, RegistryError>;

    /// Look up the live session registered under `id`
    async fn resolve(&self, id: &SessionId) -> Result<SessionHandle, RegistryError>;

    /// Stop the session unconditionally. Returns whether a live session was
    /// stopped.
    async fn stop(&self, id: &SessionId) -> bool;

    /// Receive a [`SessionExit`] for every session that leaves the registry
    fn subscribe_exits(&self) -> broadcast::Receiver<SessionExit>;

    /// Number of live sessions
    fn live_count(&self) -> usize;
}
