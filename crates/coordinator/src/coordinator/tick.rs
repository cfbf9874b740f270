//! Promotion and status aggregation

use arcade_session_core::{SessionHandle, SessionStatus};
use futures::future::join_all;

use super::Coordinator;
use crate::events::CoordinatorEvent;
use crate::status::CoordinatorStatus;

impl Coordinator {
    /// Re-evaluate the schedule and publish a snapshot.
    ///
    /// Readiness is polled from the sessions on every tick; nothing is cached.
    /// A promoted session stays active even if its readiness drops before it
    /// starts, and is asked to start again on every later tick.
    pub(super) async fn tick(&mut self) {
        if self.state.active().is_none() {
            self.promote_first_ready().await;
        }

        if let Some(active) = self.state.active() {
            match active.start_if_ready().await {
                Ok(true) => tracing::info!("Session {} started", active.id()),
                Ok(false) => {}
                Err(e) => tracing::warn!("Could not start session {}: {}", active.id(), e),
            }
        }

        let status = self.aggregate_status().await;
        self.events.publish(CoordinatorEvent::CoordinatorUpdate(status));
    }

    async fn promote_first_ready(&mut self) {
        let mut ready = None;

        for (index, candidate) in self.state.backlog().enumerate() {
            match candidate.status().await {
                Ok(status) if status.ready => {
                    ready = Some(index);
                    break;
                }
                Ok(_) => {}
                Err(e) => tracing::warn!("Skipping backlog session {}: {}", candidate.id(), e),
            }
        }

        let Some(index) = ready else {
            return;
        };
        if let Some(promoted) = self.state.promote(index) {
            tracing::info!("Promoted session {} to the active slot", promoted.id());
        }
    }

    /// Query every scheduled session, active first then backlog in order
    pub(super) async fn aggregate_status(&self) -> CoordinatorStatus {
        let active = match self.state.active() {
            Some(handle) => Some(session_status(handle).await),
            None => None,
        };
        let backlog = join_all(self.state.backlog().map(session_status)).await;

        CoordinatorStatus { active, backlog }
    }
}

async fn session_status(handle: &SessionHandle) -> SessionStatus {
    match handle.status().await {
        Ok(status) => status,
        Err(e) => {
            tracing::warn!("Status of session {} unavailable: {}", handle.id(), e);
            SessionStatus::unreachable(handle.id().clone(), handle.kind().clone())
        }
    }
}
