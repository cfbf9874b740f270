//! Session actors and their handles

mod actor;
mod handle;

pub(crate) use actor::SessionCommand;
pub use actor::spawn_session;
pub use handle::SessionHandle;
