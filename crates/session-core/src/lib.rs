//! # Arcade Session-Core
//!
//! The session layer scheduled by the arcade coordinator.
//!
//! A *session* is one running game. Each session lives in its own tokio task
//! (the session actor) that exclusively owns a [`game::Game`] state machine.
//! Everything outside the actor talks to it through a cheap, cloneable
//! [`session::SessionHandle`] using request/response messages bounded by a
//! call timeout.
//!
//! Sessions are created, looked up and stopped through a
//! [`registry::SessionRegistry`]. The in-process implementation,
//! [`registry::LocalSessionRegistry`], supervises every actor and broadcasts a
//! [`registry::SessionExit`] whenever a session goes away, including when a
//! game panics.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use arcade_session_core::{
//!     game::BuiltinGames,
//!     registry::{LocalSessionRegistry, RegistryConfig, SessionRegistry},
//!     types::{GameKind, PlayerId, SessionId},
//! };
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let games = Arc::new(BuiltinGames::new());
//! let registry = LocalSessionRegistry::new(RegistryConfig::default(), games);
//! let handle = registry.spawn(SessionId::generate(), GameKind::from("duel")).await?;
//!
//! handle.add_player(PlayerId::from("alice")).await?;
//! handle.add_player(PlayerId::from("bob")).await?;
//! assert!(handle.status().await?.ready);
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod game;
pub mod registry;
pub mod session;
pub mod types;

pub use errors::{InvalidSessionId, RegistryError, Result, SessionError};
pub use game::{BuiltinGames, Game, GameFactory, GameStatus, TableGame, TableRules};
pub use registry::{
    ExitReason, LocalSessionRegistry, RegistryConfig, RegistryStats, SessionExit, SessionRegistry,
};
pub use session::{spawn_session, SessionHandle};
pub use types::{GameInput, GameKind, GameRejection, PlayerId, SessionId, SessionStatus};
