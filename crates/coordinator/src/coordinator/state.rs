//! Scheduler state: the active slot and the backlog

use std::collections::VecDeque;

use arcade_session_core::{SessionHandle, SessionId};

/// At most one active session; every scheduled session is either active or
/// in the backlog, never both and never twice.
#[derive(Debug, Default)]
pub(crate) struct SchedulerState {
    active: Option<SessionHandle>,
    backlog: VecDeque<SessionHandle>,
}

impl SchedulerState {
    pub(crate) fn active(&self) -> Option<&SessionHandle> {
        self.active.as_ref()
    }

    pub(crate) fn backlog(&self) -> impl Iterator<Item = &SessionHandle> {
        self.backlog.iter()
    }

    #[cfg(test)]
    pub(crate) fn backlog_len(&self) -> usize {
        self.backlog.len()
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, id: &SessionId) -> bool {
        self.scheduled().any(|h| h.id() == id)
    }

    fn scheduled(&self) -> impl Iterator<Item = &SessionHandle> {
        self.active.iter().chain(self.backlog.iter())
    }

    /// Append a newly admitted session to the end of the backlog.
    ///
    /// A scheduled handle with the same id but another registry instance is
    /// stale (its id has been handed out again) and is removed; it is
    /// returned so the caller can report its termination.
    pub(crate) fn enqueue(&mut self, handle: SessionHandle) -> Option<SessionHandle> {
        let superseded =
            self.remove_where(|h| h.id() == handle.id() && h.instance() != handle.instance());
        debug_assert!(
            !self.scheduled().any(|h| h == &handle),
            "session {} instance {} scheduled twice",
            handle.id(),
            handle.instance()
        );
        self.backlog.push_back(handle);
        superseded
    }

    /// Move the backlog entry at `index` into the empty active slot.
    ///
    /// Does nothing when the slot is occupied or the index is out of range.
    pub(crate) fn promote(&mut self, index: usize) -> Option<&SessionHandle> {
        if self.active.is_some() {
            return None;
        }
        let handle = self.backlog.remove(index)?;
        self.active = Some(handle);
        self.active.as_ref()
    }

    /// Remove the session with this id, wherever it is scheduled
    pub(crate) fn remove(&mut self, id: &SessionId) -> Option<SessionHandle> {
        self.remove_where(|h| h.id() == id)
    }

    /// Remove the session only if it is the given registry instance
    pub(crate) fn remove_instance(
        &mut self,
        id: &SessionId,
        instance: u64,
    ) -> Option<SessionHandle> {
        self.remove_where(|h| h.id() == id && h.instance() == instance)
    }

    fn remove_where(&mut self, matches: impl Fn(&SessionHandle) -> bool) -> Option<SessionHandle> {
        if self.active.as_ref().is_some_and(&matches) {
            return self.active.take();
        }
        let index = self.backlog.iter().position(matches)?;
        self.backlog.remove(index)
    }

    /// Every scheduled handle, active first
    pub(crate) fn handles(&self) -> Vec<SessionHandle> {
        self.scheduled().cloned().collect()
    }

    /// Empty the scheduler, returning what was scheduled
    pub(crate) fn drain(&mut self) -> Vec<SessionHandle> {
        self.active.take().into_iter().chain(self.backlog.drain(..)).collect()
    }
}
