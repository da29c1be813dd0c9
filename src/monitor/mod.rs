//! Inactivity enforcement and cross-context session synchronization.
//!
//! One `IdleMonitor` runs per session domain per browsing context. It arms a countdown
//! while a session record exists, restarts it on every tracked interaction, and on
//! expiry clears the record and sends the context back to the entry view. Removal of
//! the record by any other context has the same effect immediately.

mod activity;
mod timer;
mod sync;
mod idle;

pub use activity::{ActivityKind, ActivitySources};
pub use timer::{IdleTimer, wait_until};
pub use sync::{SessionSynchronizer, SyncAction};
pub use idle::{IdleMonitor, MonitorHandle, MonitorState, MonitorCommand};
