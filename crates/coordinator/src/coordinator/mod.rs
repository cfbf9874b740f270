//! The coordinator actor
//!
//! One tokio task owns the scheduler state and processes commands one at a
//! time in the order they were accepted. Every mutating operation ends with a
//! tick: promote the first ready backlog entry into an empty slot, ask the
//! active session to start, then publish a fresh snapshot.

mod actor;
mod handle;
mod ops;
mod state;
mod tick;

pub use handle::CoordinatorHandle;

use std::sync::Arc;

use arcade_session_core::{GameInput, GameKind, PlayerId, SessionId, SessionRegistry};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::config::CoordinatorConfig;
use crate::errors::Result;
use crate::events::CoordinatorEventProcessor;
use crate::status::CoordinatorStatus;
use state::SchedulerState;

/// Commands accepted by the coordinator actor
pub(crate) enum CoordinatorCommand {
    QueueGame {
        kind: GameKind,
        player: PlayerId,
        reply: oneshot::Sender<Result<SessionId>>,
    },
    JoinGame {
        id: SessionId,
        player: PlayerId,
        reply: oneshot::Sender<Result<()>>,
    },
    LeaveGame {
        id: SessionId,
        player: PlayerId,
        reply: oneshot::Sender<Result<()>>,
    },
    RouteInput {
        player: PlayerId,
        input: GameInput,
    },
    TerminateGame {
        id: SessionId,
    },
    GetStatus {
        reply: oneshot::Sender<CoordinatorStatus>,
    },
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}

type IdSource = Box<dyn FnMut() -> SessionId + Send + Sync>;

/// Single-slot scheduler for game sessions.
///
/// Build one with [`Coordinator::new`], then [`spawn`](Coordinator::spawn) it
/// and talk to it through the returned [`CoordinatorHandle`]. The scheduler
/// starts with an empty slot and an empty backlog.
pub struct Coordinator {
    config: CoordinatorConfig,
    registry: Arc<dyn SessionRegistry>,
    events: CoordinatorEventProcessor,
    id_source: IdSource,
    state: SchedulerState,
}

impl Coordinator {
    pub fn new(config: CoordinatorConfig, registry: Arc<dyn SessionRegistry>) -> Self {
        let events = CoordinatorEventProcessor::new(config.event_channel_capacity);
        Self {
            config,
            registry,
            events,
            id_source: Box::new(SessionId::generate),
            state: SchedulerState::default(),
        }
    }

    /// Publish on an existing event processor instead of a private one
    pub fn with_events(mut self, events: CoordinatorEventProcessor) -> Self {
        self.events = events;
        self
    }

    /// Replace the random identifier generator
    pub fn with_id_source(
        mut self,
        source: impl FnMut() -> SessionId + Send + Sync + 'static,
    ) -> Self {
        self.id_source = Box::new(source);
        self
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    pub fn events(&self) -> &CoordinatorEventProcessor {
        &self.events
    }

    /// Start the actor task
    pub fn spawn(self) -> (CoordinatorHandle, JoinHandle<()>) {
        let (commands_tx, commands_rx) = mpsc::channel(self.config.command_channel_capacity.max(1));
        let handle = CoordinatorHandle::new(commands_tx, self.events.clone());
        // Subscribe before the task starts so no exit is missed.
        let exits = self.registry.subscribe_exits();
        let task = tokio::spawn(self.run(commands_rx, exits));
        (handle, task)
    }
}

impl std::fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("config", &self.config)
            .field("state", &self.state)
            .finish()
    }
}
