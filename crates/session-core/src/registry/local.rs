//! In-process session registry with actor supervision

use std::any::Any;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::broadcast;
use tokio::task::{AbortHandle, JoinError};

use super::{ExitReason, RegistryConfig, SessionExit, SessionRegistry};
use crate::errors::RegistryError;
use crate::game::GameFactory;
use crate::session::{spawn_session, SessionHandle};
use crate::types::{GameKind, SessionId};

/// Counters describing registry activity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RegistryStats {
    pub live: usize,
    pub total_created: u64,
    pub total_stopped: u64,
    pub total_crashed: u64,
}

#[derive(Debug, Default)]
struct RegistryCounters {
    created: AtomicU64,
    stopped: AtomicU64,
    crashed: AtomicU64,
}

struct SessionEntry {
    handle: SessionHandle,
    abort: AbortHandle,
}

struct RegistryInner {
    sessions: DashMap<SessionId, SessionEntry>,
    factory: Arc<dyn GameFactory>,
    config: RegistryConfig,
    exits: broadcast::Sender<SessionExit>,
    next_instance: AtomicU64,
    counters: RegistryCounters,
}

/// Registry running every session as a tokio task in this process.
///
/// Each session actor is watched by a monitor task. When an actor ends by
/// itself (most importantly when its game panics) the monitor unregisters the
/// session and broadcasts a [`SessionExit`], so owners of stale handles can
/// reconcile.
#[derive(Clone)]
pub struct LocalSessionRegistry {
    inner: Arc<RegistryInner>,
}

impl LocalSessionRegistry {
    pub fn new(config: RegistryConfig, factory: Arc<dyn GameFactory>) -> Self {
        let (exits, _) = broadcast::channel(config.exit_channel_capacity.max(1));
        Self {
            inner: Arc::new(RegistryInner {
                sessions: DashMap::new(),
                factory,
                config,
                exits,
                next_instance: AtomicU64::new(1),
                counters: RegistryCounters::default(),
            }),
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.inner.config
    }

    /// Identifiers of all live sessions, sorted
    pub fn list_sessions(&self) -> Vec<SessionId> {
        let mut ids: Vec<_> = self.inner.sessions.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }

    pub fn stats(&self) -> RegistryStats {
        let counters = &self.inner.counters;
        RegistryStats {
            live: self.inner.sessions.len(),
            total_created: counters.created.load(Ordering::Relaxed),
            total_stopped: counters.stopped.load(Ordering::Relaxed),
            total_crashed: counters.crashed.load(Ordering::Relaxed),
        }
    }

    /// Stop every live session
    pub fn shutdown(&self) {
        let ids = self.list_sessions();
        if !ids.is_empty() {
            tracing::info!("Stopping {} live sessions", ids.len());
        }
        for id in ids {
            self.inner.stop(&id);
        }
    }
}

impl RegistryInner {
    fn stop(&self, id: &SessionId) -> bool {
        let Some((_, entry)) = self.sessions.remove(id) else {
            return false;
        };

        entry.abort.abort();
        self.counters.stopped.fetch_add(1, Ordering::Relaxed);
        tracing::debug!("Stopped session {}", id);

        let _ = self.exits.send(SessionExit {
            session_id: id.clone(),
            instance: entry.handle.instance(),
            reason: ExitReason::Stopped,
        });
        true
    }

    fn on_actor_finished(&self, id: SessionId, instance: u64, outcome: Result<(), JoinError>) {
        // An explicit stop already unregistered and reported the session.
        let removed = self
            .sessions
            .remove_if(&id, |_, entry| entry.handle.instance() == instance)
            .is_some();
        if !removed {
            return;
        }

        let reason = match outcome {
            Ok(()) => ExitReason::Completed,
            Err(e) if e.is_panic() => ExitReason::Crashed(panic_message(e.into_panic())),
            Err(_) => ExitReason::Stopped,
        };

        match &reason {
            ExitReason::Crashed(message) => {
                self.counters.crashed.fetch_add(1, Ordering::Relaxed);
                tracing::error!("Session {} crashed: {}", id, message);
            }
            _ => tracing::info!("Session {} exited: {:?}", id, reason),
        }

        let _ = self.exits.send(SessionExit {
            session_id: id,
            instance,
            reason,
        });
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[async_trait]
impl SessionRegistry for LocalSessionRegistry {
    async fn spawn(&self, id: SessionId, kind: GameKind) -> Result<SessionHandle, RegistryError> {
        let inner = &self.inner;

        match inner.sessions.entry(id.clone()) {
            Entry::Occupied(_) => Err(RegistryError::IdInUse { session_id: id }),
            Entry::Vacant(slot) => {
                let game = inner.factory.create(&kind)?;
                let instance = inner.next_instance.fetch_add(1, Ordering::Relaxed);
                let (handle, task) = spawn_session(
                    id.clone(),
                    kind,
                    instance,
                    game,
                    inner.config.mailbox_capacity,
                    inner.config.call_timeout,
                );

                slot.insert(SessionEntry {
                    handle: handle.clone(),
                    abort: task.abort_handle(),
                });
                inner.counters.created.fetch_add(1, Ordering::Relaxed);

                let monitor = Arc::clone(inner);
                tokio::spawn(async move {
                    let outcome = task.await;
                    monitor.on_actor_finished(id, instance, outcome);
                });

                tracing::debug!("Spawned session {} ({})", handle.id(), handle.kind());
                Ok(handle)
            }
        }
    }

    async fn resolve(&self, id: &SessionId) -> Result<SessionHandle, RegistryError> {
        self.inner
            .sessions
            .get(id)
            .map(|entry| entry.handle.clone())
            .ok_or_else(|| RegistryError::not_found(id))
    }

    async fn stop(&self, id: &SessionId) -> bool {
        self.inner.stop(id)
    }

    fn subscribe_exits(&self) -> broadcast::Receiver<SessionExit> {
        self.inner.exits.subscribe()
    }

    fn live_count(&self) -> usize {
        self.inner.sessions.len()
    }
}

impl std::fmt::Debug for LocalSessionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalSessionRegistry")
            .field("config", &self.inner.config)
            .field("live", &self.inner.sessions.len())
            .finish()
    }
}
