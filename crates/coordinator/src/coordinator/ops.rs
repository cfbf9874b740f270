//! Coordinator operations: admission, membership, routing and termination

use std::future::Future;

use arcade_session_core::{
    GameInput, GameKind, PlayerId, RegistryError, SessionExit, SessionHandle, SessionId,
};

use super::Coordinator;
use crate::errors::{CoordinatorError, Result};
use crate::events::CoordinatorEvent;

impl Coordinator {
    /// Admit a new session with `player` already seated, returning its id
    pub(super) async fn queue_game(
        &mut self,
        kind: GameKind,
        player: PlayerId,
    ) -> Result<SessionId> {
        let handle = self.spawn_session(&kind).await?;

        if let Err(e) = handle.add_player(player.clone()).await {
            tracing::warn!(
                "Initial join of {} to new session {} failed, stopping it: {}",
                player,
                handle.id(),
                e
            );
            self.stop_in_registry(handle.id()).await;
            return Err(e.into());
        }

        let id = handle.id().clone();
        tracing::info!("Queued {} session {} for {}", kind, id, player);
        if let Some(stale) = self.state.enqueue(handle) {
            tracing::warn!(
                "Session id {} was reused while instance {} was still scheduled, removing it",
                id,
                stale.instance()
            );
            self.events.publish(CoordinatorEvent::GameTerminated(id.clone()));
        }
        self.tick().await;
        Ok(id)
    }

    pub(super) async fn join_game(&mut self, id: SessionId, player: PlayerId) -> Result<()> {
        let handle = self.resolve(&id).await?;
        handle.add_player(player.clone()).await?;
        tracing::debug!("Player {} joined session {}", player, id);
        self.tick().await;
        Ok(())
    }

    pub(super) async fn leave_game(&mut self, id: SessionId, player: PlayerId) -> Result<()> {
        let handle = self.resolve(&id).await?;
        handle.remove_player(player.clone()).await?;
        tracing::debug!("Player {} left session {}", player, id);
        self.tick().await;
        Ok(())
    }

    /// Forward input to the active session; dropped when the slot is empty
    pub(super) fn route_input(&self, player: PlayerId, input: GameInput) {
        match self.state.active() {
            Some(active) => active.handle_input(player, input),
            None => tracing::trace!("No active session, dropping input from {}", player),
        }
    }

    pub(super) async fn terminate_game(&mut self, id: SessionId) {
        let stopped = self.stop_in_registry(&id).await;

        match self.state.remove(&id) {
            Some(_) => {
                tracing::info!("Terminated session {}", id);
                self.events.publish(CoordinatorEvent::GameTerminated(id));
            }
            None => tracing::debug!(
                "Terminated session {} was not scheduled (stopped: {})",
                id,
                stopped
            ),
        }

        self.tick().await;
    }

    /// Drop a session that left the registry without going through
    /// `terminate_game`, e.g. because its game panicked
    pub(super) async fn reconcile_exit(&mut self, exit: SessionExit) {
        if self.state.remove_instance(&exit.session_id, exit.instance).is_none() {
            return;
        }

        tracing::warn!(
            "Scheduled session {} exited ({:?}), removing it",
            exit.session_id,
            exit.reason
        );
        self.events.publish(CoordinatorEvent::GameTerminated(exit.session_id));
        self.tick().await;
    }

    /// Compare every scheduled handle with the registry and drop the ones
    /// that are no longer live
    pub(super) async fn resync(&mut self) {
        let mut removed = false;

        for handle in self.state.handles() {
            let live = match self.resolve(handle.id()).await {
                Ok(current) => current == handle,
                Err(CoordinatorError::DownstreamTimeout { .. }) => true,
                Err(_) => false,
            };
            if !live {
                tracing::warn!("Scheduled session {} is gone, removing it", handle.id());
                self.state.remove_instance(handle.id(), handle.instance());
                self.events.publish(CoordinatorEvent::GameTerminated(handle.id().clone()));
                removed = true;
            }
        }

        if removed {
            self.tick().await;
        }
    }

    /// Spawn under a fresh id, drawing again while the registry reports
    /// collisions
    async fn spawn_session(&mut self, kind: &GameKind) -> Result<SessionHandle> {
        let attempts = self.config.id_generation_attempts.max(1);

        for attempt in 1..=attempts {
            let id = (self.id_source)();
            match self.registry_call(self.registry.spawn(id.clone(), kind.clone())).await? {
                Ok(handle) => return Ok(handle),
                Err(RegistryError::IdInUse { .. }) => {
                    tracing::debug!("Session id {} in use (attempt {}/{})", id, attempt, attempts)
                }
                Err(e) => return Err(CoordinatorError::spawn_failure(kind, e)),
            }
        }

        Err(CoordinatorError::SpawnFailure {
            kind: kind.clone(),
            reason: format!("no free session id after {attempts} attempts"),
        })
    }

    async fn resolve(&self, id: &SessionId) -> Result<SessionHandle> {
        self.registry_call(self.registry.resolve(id))
            .await?
            .map_err(|_| CoordinatorError::ResolutionFailure {
                session_id: id.clone(),
            })
    }

    /// Stop a session in the registry; returns whether it was live
    pub(super) async fn stop_in_registry(&self, id: &SessionId) -> bool {
        match self.registry_call(self.registry.stop(id)).await {
            Ok(stopped) => stopped,
            Err(e) => {
                tracing::error!("Failed to stop session {}: {}", id, e);
                false
            }
        }
    }

    async fn registry_call<T>(&self, call: impl Future<Output = T>) -> Result<T> {
        let timeout = self.config.call_timeout();
        tokio::time::timeout(timeout, call)
            .await
            .map_err(|_| CoordinatorError::registry_timeout(timeout.as_millis() as u64))
    }
}
