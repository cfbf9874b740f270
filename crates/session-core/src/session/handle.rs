//! Typed handle to a session actor

use std::fmt;
use std::hash::{Hash, Hasher};
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};

use super::SessionCommand;
use crate::errors::{Result, SessionError};
use crate::types::{GameInput, GameKind, PlayerId, SessionId, SessionStatus};

/// Addressable reference to a live session.
///
/// Cloning is cheap. Every request/response call is bounded by the handle's
/// call timeout, so an unresponsive game surfaces as
/// [`SessionError::Timeout`] instead of stalling the caller.
///
/// Two handles are equal when they name the same session instance: the same
/// identifier spawned by the same registry spawn call.
#[derive(Clone)]
pub struct SessionHandle {
    id: SessionId,
    kind: GameKind,
    instance: u64,
    mailbox: mpsc::Sender<SessionCommand>,
    call_timeout: Duration,
}

impl SessionHandle {
    pub(crate) fn new(
        id: SessionId,
        kind: GameKind,
        instance: u64,
        mailbox: mpsc::Sender<SessionCommand>,
        call_timeout: Duration,
    ) -> Self {
        Self {
            id,
            kind,
            instance,
            mailbox,
            call_timeout,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn kind(&self) -> &GameKind {
        &self.kind
    }

    /// Registry-assigned instance number; distinguishes reuses of an id
    pub fn instance(&self) -> u64 {
        self.instance
    }

    pub fn call_timeout(&self) -> Duration {
        self.call_timeout
    }

    /// `true` once the session actor has gone away
    pub fn is_closed(&self) -> bool {
        self.mailbox.is_closed()
    }

    pub async fn add_player(&self, player: PlayerId) -> Result<()> {
        self.call(|reply| SessionCommand::AddPlayer { player, reply })
            .await?
            .map_err(|rejection| SessionError::rejected(&self.id, rejection))
    }

    pub async fn remove_player(&self, player: PlayerId) -> Result<()> {
        self.call(|reply| SessionCommand::RemovePlayer { player, reply })
            .await?
            .map_err(|rejection| SessionError::rejected(&self.id, rejection))
    }

    pub async fn status(&self) -> Result<SessionStatus> {
        self.call(|reply| SessionCommand::GetStatus { reply }).await
    }

    /// Ask the game to start if it is ready; `Ok(true)` when it started now
    pub async fn start_if_ready(&self) -> Result<bool> {
        self.call(|reply| SessionCommand::StartIfReady { reply }).await
    }

    /// Forward an input without waiting for the game.
    ///
    /// Inputs are dropped (and logged) when the mailbox is full or closed.
    pub fn handle_input(&self, player: PlayerId, input: GameInput) {
        let command = SessionCommand::HandleInput { player, input };
        if let Err(e) = self.mailbox.try_send(command) {
            match e {
                mpsc::error::TrySendError::Full(_) => {
                    tracing::warn!("Session {} mailbox full, dropping input", self.id)
                }
                mpsc::error::TrySendError::Closed(_) => {
                    tracing::debug!("Session {} is gone, dropping input", self.id)
                }
            }
        }
    }

    async fn call<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> SessionCommand,
    ) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();
        let exchange = async {
            self.mailbox
                .send(command(reply_tx))
                .await
                .map_err(|_| SessionError::unavailable(&self.id))?;
            reply_rx.await.map_err(|_| SessionError::unavailable(&self.id))
        };

        match tokio::time::timeout(self.call_timeout, exchange).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    "Session {} did not answer within {:?}",
                    self.id,
                    self.call_timeout
                );
                Err(SessionError::Timeout {
                    session_id: self.id.clone(),
                    timeout_ms: self.call_timeout.as_millis() as u64,
                })
            }
        }
    }
}

impl PartialEq for SessionHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.instance == other.instance
    }
}

impl Eq for SessionHandle {}

impl Hash for SessionHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        self.instance.hash(state);
    }
}

impl fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionHandle")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("instance", &self.instance)
            .field("closed", &self.is_closed())
            .finish()
    }
}
