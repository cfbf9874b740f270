//! # Arcade Coordinator
//!
//! Schedules game sessions onto a single active slot.
//!
//! Sessions are admitted into a FIFO backlog. Whenever the slot is free the
//! first backlog entry that reports itself ready is promoted and asked to
//! start. Player input is routed to the active session only. After every
//! state-changing operation the coordinator publishes a
//! [`CoordinatorEvent::CoordinatorUpdate`] snapshot; removals are announced
//! first with [`CoordinatorEvent::GameTerminated`].
//!
//! The coordinator is a single tokio task. All operations go through a
//! [`CoordinatorHandle`] and are applied one at a time, so a snapshot
//! published at the end of one operation reflects every earlier operation and
//! nothing later.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use arcade_coordinator::{Coordinator, CoordinatorConfig, CoordinatorEvent};
//! use arcade_session_core::LocalSessionRegistry;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = CoordinatorConfig::default();
//! let games = Arc::new(config.game_factory());
//! let registry = LocalSessionRegistry::new(config.registry_config(), games);
//! let (coordinator, _task) = Coordinator::new(config, Arc::new(registry)).spawn();
//!
//! let mut events = coordinator.subscribe();
//! let id = coordinator.queue_game("duel", "alice").await?;
//! coordinator.join_game(&id, "bob").await?;
//!
//! while let Ok(event) = events.receive().await {
//!     if let CoordinatorEvent::CoordinatorUpdate(status) = event {
//!         println!("active: {:?}", status.active_id());
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod coordinator;
pub mod errors;
pub mod events;
pub mod status;

pub use config::{CoordinatorConfig, GameRulesConfig};
pub use coordinator::{Coordinator, CoordinatorHandle};
pub use errors::{CoordinatorError, Result};
pub use events::{
    CoordinatorEvent, CoordinatorEventProcessor, CoordinatorEventSubscriber, COORDINATOR_TOPIC,
};
pub use status::CoordinatorStatus;
