//! The session actor: one tokio task per live session

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use super::SessionHandle;
use crate::game::Game;
use crate::types::{GameInput, GameKind, GameRejection, PlayerId, SessionId, SessionStatus};

/// Messages accepted by a session actor
pub(crate) enum SessionCommand {
    AddPlayer {
        player: PlayerId,
        reply: oneshot::Sender<Result<(), GameRejection>>,
    },
    RemovePlayer {
        player: PlayerId,
        reply: oneshot::Sender<Result<(), GameRejection>>,
    },
    GetStatus {
        reply: oneshot::Sender<SessionStatus>,
    },
    StartIfReady {
        reply: oneshot::Sender<bool>,
    },
    HandleInput {
        player: PlayerId,
        input: GameInput,
    },
}

/// Start an actor for `game` and return its handle and task.
///
/// The actor runs until every handle is dropped or the task is aborted.
/// Registries own the returned task and are responsible for supervising it.
pub fn spawn_session(
    id: SessionId,
    kind: GameKind,
    instance: u64,
    game: Box<dyn Game>,
    mailbox_capacity: usize,
    call_timeout: Duration,
) -> (SessionHandle, JoinHandle<()>) {
    let (mailbox_tx, mailbox_rx) = mpsc::channel(mailbox_capacity.max(1));
    let handle = SessionHandle::new(id.clone(), kind.clone(), instance, mailbox_tx, call_timeout);
    let task = tokio::spawn(run_session(id, kind, game, mailbox_rx));
    (handle, task)
}

async fn run_session(
    id: SessionId,
    kind: GameKind,
    mut game: Box<dyn Game>,
    mut mailbox: mpsc::Receiver<SessionCommand>,
) {
    tracing::debug!("Session {} ({}) running", id, kind);

    while let Some(command) = mailbox.recv().await {
        match command {
            SessionCommand::AddPlayer { player, reply } => {
                let result = game.add_player(player.clone());
                match &result {
                    Ok(()) => tracing::debug!("Session {}: player {} joined", id, player),
                    Err(rejection) => {
                        tracing::debug!(
                            "Session {}: join of {} rejected: {}",
                            id,
                            player,
                            rejection
                        )
                    }
                }
                let _ = reply.send(result);
            }
            SessionCommand::RemovePlayer { player, reply } => {
                let result = game.remove_player(&player);
                if result.is_ok() {
                    tracing::debug!("Session {}: player {} left", id, player);
                }
                let _ = reply.send(result);
            }
            SessionCommand::GetStatus { reply } => {
                let status = game.status();
                let _ = reply.send(SessionStatus {
                    id: id.clone(),
                    kind: kind.clone(),
                    ready: status.ready,
                    started: status.started,
                    players: status.players,
                    inputs_handled: status.inputs_handled,
                    reachable: true,
                });
            }
            SessionCommand::StartIfReady { reply } => {
                let started = game.start_if_ready();
                if started {
                    tracing::info!("Session {} ({}) started", id, kind);
                }
                let _ = reply.send(started);
            }
            SessionCommand::HandleInput { player, input } => {
                game.handle_input(&player, input);
            }
        }
    }

    tracing::debug!("Session {} mailbox closed, actor exiting", id);
}
