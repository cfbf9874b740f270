//! Public handle to the coordinator actor

use arcade_session_core::{GameInput, GameKind, PlayerId, SessionId};
use tokio::sync::{mpsc, oneshot};

use super::CoordinatorCommand;
use crate::errors::{CoordinatorError, Result};
use crate::events::{CoordinatorEventProcessor, CoordinatorEventSubscriber};
use crate::status::CoordinatorStatus;

/// Cloneable handle used to operate the coordinator.
///
/// Requests are processed strictly in the order they are accepted, across
/// all clones of the handle.
#[derive(Clone)]
pub struct CoordinatorHandle {
    commands: mpsc::Sender<CoordinatorCommand>,
    events: CoordinatorEventProcessor,
}

impl CoordinatorHandle {
    pub(super) fn new(
        commands: mpsc::Sender<CoordinatorCommand>,
        events: CoordinatorEventProcessor,
    ) -> Self {
        Self { commands, events }
    }

    /// Start a new session of `kind` with `player` seated and add it to the
    /// backlog. Returns the new session's id.
    pub async fn queue_game(
        &self,
        kind: impl Into<GameKind>,
        player: impl Into<PlayerId>,
    ) -> Result<SessionId> {
        let (kind, player) = (kind.into(), player.into());
        self.request(|reply| CoordinatorCommand::QueueGame { kind, player, reply })
            .await?
    }

    pub async fn join_game(&self, id: &SessionId, player: impl Into<PlayerId>) -> Result<()> {
        let (id, player) = (id.clone(), player.into());
        self.request(|reply| CoordinatorCommand::JoinGame { id, player, reply })
            .await?
    }

    pub async fn leave_game(&self, id: &SessionId, player: impl Into<PlayerId>) -> Result<()> {
        let (id, player) = (id.clone(), player.into());
        self.request(|reply| CoordinatorCommand::LeaveGame { id, player, reply })
            .await?
    }

    /// Send input to whichever session is active. No reply; dropped when no
    /// session is active.
    pub async fn route_input(&self, player: impl Into<PlayerId>, input: impl Into<GameInput>) {
        let command = CoordinatorCommand::RouteInput {
            player: player.into(),
            input: input.into(),
        };
        self.send(command).await;
    }

    /// Stop a session and remove it from the schedule. No reply.
    pub async fn terminate_game(&self, id: &SessionId) {
        self.send(CoordinatorCommand::TerminateGame { id: id.clone() })
            .await;
    }

    /// Fresh snapshot of the schedule
    pub async fn status(&self) -> Result<CoordinatorStatus> {
        self.request(|reply| CoordinatorCommand::GetStatus { reply })
            .await
    }

    pub fn subscribe(&self) -> CoordinatorEventSubscriber {
        self.events.subscribe()
    }

    /// Stop the coordinator, waiting until it has finished
    pub async fn shutdown(&self) -> Result<()> {
        self.request(|reply| CoordinatorCommand::Shutdown { reply })
            .await
    }

    pub fn is_running(&self) -> bool {
        !self.commands.is_closed()
    }

    async fn send(&self, command: CoordinatorCommand) {
        if self.commands.send(command).await.is_err() {
            tracing::debug!("Coordinator is not running, dropping command");
        }
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> CoordinatorCommand,
    ) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(command(reply_tx))
            .await
            .map_err(|_| CoordinatorError::Unavailable)?;
        reply_rx.await.map_err(|_| CoordinatorError::Unavailable)
    }
}

impl std::fmt::Debug for CoordinatorHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoordinatorHandle")
            .field("running", &self.is_running())
            .finish()
    }
}
