//! Error types for session-core

use thiserror::Error;

use crate::types::{GameKind, GameRejection, SessionId};

/// Errors returned by calls made through a [`crate::session::SessionHandle`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The game refused the request (business rule)
    #[error("session {session_id} rejected the request: {rejection}")]
    Rejected {
        session_id: SessionId,
        rejection: GameRejection,
    },

    /// The session actor is gone or dropped the request
    #[error("session {session_id} is unavailable")]
    Unavailable { session_id: SessionId },

    /// The session did not answer within the call timeout
    #[error("session {session_id} did not answer within {timeout_ms}ms")]
    Timeout { session_id: SessionId, timeout_ms: u64 },
}

impl SessionError {
    pub(crate) fn unavailable(session_id: &SessionId) -> Self {
        Self::Unavailable {
            session_id: session_id.clone(),
        }
    }

    pub(crate) fn rejected(session_id: &SessionId, rejection: GameRejection) -> Self {
        Self::Rejected {
            session_id: session_id.clone(),
            rejection,
        }
    }
}

/// Errors returned by a [`crate::registry::SessionRegistry`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// No live session is registered under the identifier
    #[error("no live session {session_id}")]
    NotFound { session_id: SessionId },

    /// A live session already uses the identifier
    #[error("session id {session_id} is already in use")]
    IdInUse { session_id: SessionId },

    /// The game factory does not know the requested kind
    #[error("unknown game kind '{kind}'")]
    UnknownKind { kind: GameKind },

    /// The session could not be started
    #[error("failed to spawn session: {message}")]
    SpawnFailed { message: String },
}

impl RegistryError {
    pub(crate) fn not_found(session_id: &SessionId) -> Self {
        Self::NotFound {
            session_id: session_id.clone(),
        }
    }
}

/// A string that is not a well-formed session identifier
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid session id '{value}': expected {expected_len} lowercase letters")]
pub struct InvalidSessionId {
    pub value: String,
    pub expected_len: usize,
}

pub type Result<T> = std::result::Result<T, SessionError>;
