//! Error types for the coordinator

use arcade_session_core::{GameKind, GameRejection, RegistryError, SessionError, SessionId};
use thiserror::Error;

/// Errors surfaced to callers of coordinator operations.
///
/// A failed operation never leaves partial scheduler state behind.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoordinatorError {
    /// The identifier does not map to a live session
    #[error("Session {session_id} could not be resolved")]
    ResolutionFailure { session_id: SessionId },

    /// The registry could not create a session
    #[error("Failed to spawn a '{kind}' session: {reason}")]
    SpawnFailure { kind: GameKind, reason: String },

    /// The session refused a membership change
    #[error("Session {session_id} rejected the request: {rejection}")]
    SessionRejected {
        session_id: SessionId,
        rejection: GameRejection,
    },

    /// A call to a session or to the registry did not complete in time
    #[error("{target} did not answer within {timeout_ms}ms")]
    DownstreamTimeout { target: String, timeout_ms: u64 },

    /// The coordinator actor is not running
    #[error("Coordinator is not running")]
    Unavailable,

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CoordinatorError {
    pub(crate) fn spawn_failure(kind: &GameKind, error: RegistryError) -> Self {
        Self::SpawnFailure {
            kind: kind.clone(),
            reason: error.to_string(),
        }
    }

    pub(crate) fn registry_timeout(timeout_ms: u64) -> Self {
        Self::DownstreamTimeout {
            target: "session registry".to_string(),
            timeout_ms,
        }
    }
}

impl From<SessionError> for CoordinatorError {
    fn from(error: SessionError) -> Self {
        match error {
            SessionError::Rejected {
                session_id,
                rejection,
            } => Self::SessionRejected {
                session_id,
                rejection,
            },
            SessionError::Unavailable { session_id } => Self::ResolutionFailure { session_id },
            SessionError::Timeout {
                session_id,
                timeout_ms,
            } => Self::DownstreamTimeout {
                target: format!("session {session_id}"),
                timeout_ms,
            },
        }
    }
}

impl From<arcade_infra_common::InfraError> for CoordinatorError {
    fn from(error: arcade_infra_common::InfraError) -> Self {
        Self::Config(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CoordinatorError>;
