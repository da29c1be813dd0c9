use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::activity::{ActivityKind, ActivitySources};
use super::sync::{SessionSynchronizer, SyncAction};
use super::timer::{wait_until, IdleTimer};
use crate::identity::SessionDomain;
use crate::router::{Route, SharedNavigator};
use crate::storage::{SharedSessionStore, StorageEvent, StorageEvents, StorageNotice};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    /// No session, no countdown.
    Inactive,
    /// Session present, countdown running.
    Armed,
    /// Countdown fired; session is being cleared.
    Expiring,
}

#[derive(Debug)]
pub enum MonitorCommand {
    Activity(ActivityKind),
    /// Re-read the store as on page mount (used after this context writes a session itself).
    Resync,
    Logout(oneshot::Sender<()>),
    Shutdown,
}

/// Idle/activity watcher for one session domain in one browsing context.
pub struct IdleMonitor {
    domain: SessionDomain,
    store: SharedSessionStore,
    navigator: SharedNavigator,
    sources: ActivitySources,
    sync: SessionSynchronizer,
    timer: IdleTimer,
    state: watch::Sender<MonitorState>,
}

impl IdleMonitor {
    pub fn new(domain: SessionDomain, threshold: Duration, store: SharedSessionStore, navigator: SharedNavigator) -> Self {
        let (state, _) = watch::channel(MonitorState::Inactive);
        Self {
            domain,
            store,
            navigator,
            sources: ActivitySources::default(),
            sync: SessionSynchronizer::new(domain),
            timer: IdleTimer::new(threshold),
            state,
        }
    }

    pub fn with_sources(mut self, sources: ActivitySources) -> Self {
        self.sources = sources;
        self
    }

    pub fn state(&self) -> MonitorState { *self.state.borrow() }

    pub fn timer(&self) -> &IdleTimer { &self.timer }

    fn set_state(&self, s: MonitorState) {
        self.state.send_replace(s);
    }

    fn session_present(&self) -> bool {
        match self.store.get(self.domain.key()) {
            Ok(v) => v.is_some(),
            Err(e) => {
                debug!(domain = ?self.domain, error = %e, "session read failed; treating as absent");
                false
            }
        }
    }

    fn arm(&mut self) {
        self.timer.arm();
        self.set_state(MonitorState::Armed);
    }

    /// Clearing must never fail outward; navigation is the authoritative logout.
    fn clear_session(&self) {
        if let Err(e) = self.store.remove(self.domain.key()) {
            warn!(domain = ?self.domain, error = %e, "could not clear session record; navigating anyway");
        }
    }

    fn leave(&mut self) {
        self.timer.cancel();
        self.navigator.navigate(Route::entry_for(self.domain));
        self.set_state(MonitorState::Inactive);
    }

    /// Initial state from what the store holds. Never navigates.
    pub fn bootstrap(&mut self) {
        if self.session_present() {
            self.arm();
        } else {
            self.timer.cancel();
            self.set_state(MonitorState::Inactive);
        }
        debug!(domain = ?self.domain, state = ?self.state(), "idle monitor bootstrapped");
    }

    pub fn on_activity(&mut self, kind: ActivityKind) {
        if !self.sources.contains(kind) { return; }
        match self.state() {
            MonitorState::Armed => self.timer.arm(),
            MonitorState::Inactive => {
                if self.session_present() { self.arm(); }
            }
            MonitorState::Expiring => {}
        }
    }

    pub fn on_storage_event(&mut self, ev: &StorageEvent) {
        match self.sync.classify(ev) {
            SyncAction::ForceLogout => {
                info!(domain = ?self.domain, origin = %ev.origin, "session removed in another context; leaving");
                self.leave();
            }
            SyncAction::Adopt => {
                debug!(domain = ?self.domain, origin = %ev.origin, "session written in another context; re-arming");
                self.arm();
            }
            SyncAction::Ignore => {}
        }
    }

    /// Some changes were dropped before this monitor saw them. Re-read the store and
    /// apply whatever a removal or foreign login would have done.
    pub fn on_missed_events(&mut self) {
        let present = self.session_present();
        match (self.state(), present) {
            (MonitorState::Armed, false) => {
                info!(domain = ?self.domain, "session gone while events were missed; leaving");
                self.leave();
            }
            (MonitorState::Inactive, true) => {
                debug!(domain = ?self.domain, "session appeared while events were missed; re-arming");
                self.arm();
            }
            _ => {}
        }
    }

    /// Countdown reached the threshold. A stale firing (not `Armed`) is a no-op.
    pub fn on_timer_fired(&mut self) {
        if self.state() != MonitorState::Armed { return; }
        self.set_state(MonitorState::Expiring);
        info!(domain = ?self.domain, threshold_secs = self.timer.threshold().as_secs(), "idle timeout reached; clearing session");
        self.timer.cancel();
        self.clear_session();
        self.leave();
    }

    /// Explicit logout: cancel the countdown first, then clear, then navigate once.
    pub fn logout(&mut self) {
        self.timer.cancel();
        self.clear_session();
        info!(domain = ?self.domain, "session logged out");
        self.leave();
    }

    /// Start the event loop. Subscribes before bootstrapping so no change is missed.
    pub fn spawn(mut self) -> (MonitorHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let events = self.store.subscribe();
        self.bootstrap();
        let handle = MonitorHandle { tx, state: self.state.subscribe(), domain: self.domain };
        let task = tokio::spawn(self.run(rx, events));
        (handle, task)
    }

    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<MonitorCommand>, mut events: StorageEvents) {
        let mut events_open = true;
        loop {
            let deadline = self.timer.deadline();
            tokio::select! {
                biased;
                cmd = commands.recv() => match cmd {
                    Some(MonitorCommand::Activity(kind)) => self.on_activity(kind),
                    Some(MonitorCommand::Resync) => self.bootstrap(),
                    Some(MonitorCommand::Logout(ack)) => {
                        self.logout();
                        let _ = ack.send(());
                    }
                    Some(MonitorCommand::Shutdown) | None => break,
                },
                notice = events.next_notice(), if events_open => match notice {
                    Some(StorageNotice::Change(ev)) => self.on_storage_event(&ev),
                    Some(StorageNotice::Missed(_)) => self.on_missed_events(),
                    None => events_open = false,
                },
                _ = wait_until(deadline) => self.on_timer_fired(),
            }
        }
        debug!(domain = ?self.domain, "idle monitor stopped");
    }
}

/// Cheap handle to a running monitor.
#[derive(Clone)]
pub struct MonitorHandle {
    tx: mpsc::UnboundedSender<MonitorCommand>,
    state: watch::Receiver<MonitorState>,
    domain: SessionDomain,
}

impl MonitorHandle {
    pub fn domain(&self) -> SessionDomain { self.domain }

    /// Report one interaction. Never blocks.
    pub fn activity(&self, kind: ActivityKind) {
        let _ = self.tx.send(MonitorCommand::Activity(kind));
    }

    pub fn resync(&self) {
        let _ = self.tx.send(MonitorCommand::Resync);
    }

    /// Resolves once the session is cleared and navigation has happened.
    pub async fn logout(&self) {
        let (ack, done) = oneshot::channel();
        if self.tx.send(MonitorCommand::Logout(ack)).is_ok() {
            let _ = done.await;
        }
    }

    pub fn shutdown(&self) {
        let _ = self.tx.send(MonitorCommand::Shutdown);
    }

    pub fn state(&self) -> MonitorState { *self.state.borrow() }

    pub fn subscribe(&self) -> watch::Receiver<MonitorState> { self.state.clone() }
}

#[cfg(test)]
#[path = "idle_tests.rs"]
mod idle_tests;
