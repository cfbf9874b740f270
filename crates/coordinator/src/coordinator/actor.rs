//! Actor loop

use arcade_session_core::SessionExit;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::sync::{broadcast, mpsc};

use super::{Coordinator, CoordinatorCommand};

impl Coordinator {
    pub(super) async fn run(
        mut self,
        mut commands: mpsc::Receiver<CoordinatorCommand>,
        mut exits: broadcast::Receiver<SessionExit>,
    ) {
        tracing::info!("Coordinator started");
        let mut exits_open = true;

        loop {
            tokio::select! {
                biased;

                command = commands.recv() => {
                    let Some(command) = command else {
                        tracing::debug!("All coordinator handles dropped");
                        self.shutdown().await;
                        break;
                    };
                    if exits_open {
                        exits_open = self.drain_exits(&mut exits).await;
                    }
                    if !self.handle_command(command).await {
                        break;
                    }
                }

                exit = exits.recv(), if exits_open => match exit {
                    Ok(exit) => self.reconcile_exit(exit).await,
                    Err(RecvError::Lagged(skipped)) => self.exits_lagged(skipped).await,
                    Err(RecvError::Closed) => {
                        tracing::warn!("Session exit channel closed, no longer reconciling exits");
                        exits_open = false;
                    }
                },
            }
        }

        tracing::info!("Coordinator stopped");
    }

    /// Reconcile exits already waiting in the channel, so a command never
    /// sees a session the registry has let go of. Returns `false` once the
    /// channel is closed.
    async fn drain_exits(&mut self, exits: &mut broadcast::Receiver<SessionExit>) -> bool {
        loop {
            match exits.try_recv() {
                Ok(exit) => self.reconcile_exit(exit).await,
                Err(TryRecvError::Lagged(skipped)) => self.exits_lagged(skipped).await,
                Err(TryRecvError::Empty) => return true,
                Err(TryRecvError::Closed) => {
                    tracing::warn!("Session exit channel closed, no longer reconciling exits");
                    return false;
                }
            }
        }
    }

    async fn exits_lagged(&mut self, skipped: u64) {
        tracing::warn!(
            "Missed {} session exits, resynchronizing with the registry",
            skipped
        );
        self.resync().await;
    }

    /// Returns `false` once the actor should stop
    async fn handle_command(&mut self, command: CoordinatorCommand) -> bool {
        match command {
            CoordinatorCommand::QueueGame {
                kind,
                player,
                reply,
            } => {
                let result = self.queue_game(kind, player).await;
                let _ = reply.send(result);
            }
            CoordinatorCommand::JoinGame { id, player, reply } => {
                let result = self.join_game(id, player).await;
                let _ = reply.send(result);
            }
            CoordinatorCommand::LeaveGame { id, player, reply } => {
                let result = self.leave_game(id, player).await;
                let _ = reply.send(result);
            }
            CoordinatorCommand::RouteInput { player, input } => {
                self.route_input(player, input);
            }
            CoordinatorCommand::TerminateGame { id } => {
                self.terminate_game(id).await;
            }
            CoordinatorCommand::GetStatus { reply } => {
                let status = self.aggregate_status().await;
                let _ = reply.send(status);
            }
            CoordinatorCommand::Shutdown { reply } => {
                self.shutdown().await;
                let _ = reply.send(());
                return false;
            }
        }
        true
    }

    async fn shutdown(&mut self) {
        let scheduled = self.state.drain();
        if !self.config.stop_sessions_on_shutdown {
            tracing::info!(
                "Coordinator shutting down, leaving {} sessions running",
                scheduled.len()
            );
            return;
        }

        tracing::info!("Coordinator shutting down, stopping {} sessions", scheduled.len());
        for handle in scheduled {
            self.stop_in_registry(handle.id()).await;
        }
    }
}
