//! Scheduler snapshots

use arcade_session_core::{SessionId, SessionStatus};
use serde::{Deserialize, Serialize};

/// Snapshot of the scheduler: the active session and the backlog in order,
/// each as reported by the session itself when the snapshot was taken
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinatorStatus {
    pub active: Option<SessionStatus>,
    pub backlog: Vec<SessionStatus>,
}

impl CoordinatorStatus {
    pub fn active_id(&self) -> Option<&SessionId> {
        self.active.as_ref().map(|status| &status.id)
    }

    pub fn backlog_ids(&self) -> Vec<&SessionId> {
        self.backlog.iter().map(|status| &status.id).collect()
    }

    /// No session is scheduled at all
    pub fn is_idle(&self) -> bool {
        self.active.is_none() && self.backlog.is_empty()
    }

    /// Number of scheduled sessions, active included
    pub fn len(&self) -> usize {
        self.backlog.len() + usize::from(self.active.is_some())
    }
}
