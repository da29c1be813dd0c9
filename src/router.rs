//!
//! Role-gated entry and navigation
//! -------------------------------
//! The login page clears any existing session on every visit; a successful login commits
//! the identity and sends the user to the landing view of their role. Pages read the
//! session at mount time and treat a missing or unreadable record as "still loading";
//! only the idle monitor and the synchronizer redirect on a confirmed absence.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::identity::{Authenticator, Identity, LoginRequest, PetugasLogin, Role, SessionDomain, SessionRecord};
use crate::storage::{read_json, write_json, SharedSessionStore, SessionStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// Main login page.
    Entry,
    Landing(Role),
    PetugasLogin,
    PetugasTransaksi,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Entry => "/",
            Route::Landing(role) => role.landing_route(),
            Route::PetugasLogin => "/petugas/login",
            Route::PetugasTransaksi => "/petugas/transaksi",
        }
    }

    /// Where a context goes when the given session domain ends.
    pub fn entry_for(domain: SessionDomain) -> Route {
        match domain {
            SessionDomain::Main => Route::Entry,
            SessionDomain::Petugas => Route::PetugasLogin,
        }
    }
}

pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

pub type SharedNavigator = Arc<dyn Navigator>;

/// Keeps the navigation history of a context; its last entry is the current location.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    history: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    pub fn new() -> Self { Self::default() }

    pub fn history(&self) -> Vec<Route> { self.history.lock().clone() }

    pub fn current(&self) -> Option<Route> { self.history.lock().last().copied() }

    pub fn count(&self, route: Route) -> usize { self.history.lock().iter().filter(|r| **r == route).count() }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        debug!(path = route.path(), "navigate");
        self.history.lock().push(route);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageSession {
    Loading,
    Ready(SessionRecord),
}

/// Session as a page sees it at mount time.
pub fn page_session(store: &dyn SessionStore) -> PageSession {
    match read_json::<SessionRecord>(store, SessionDomain::Main.key()) {
        Ok(Some(rec)) => PageSession::Ready(rec),
        Ok(None) => PageSession::Loading,
        Err(e) => {
            debug!(error = %e, "session not readable yet");
            PageSession::Loading
        }
    }
}

pub const MSG_REJECTED: &str = "Invalid phone number/username or password, or the account is inactive";
pub const MSG_FAILED: &str = "A system error occurred while signing in; please try again";
pub const MSG_NOT_OFFICER: &str = "This account is not allowed to record transactions";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    LoggedIn(Identity),
    /// No single active account matched.
    Rejected(String),
    /// Lookup or session commit failed.
    Failed(String),
    /// Another submission from this flow is still in flight.
    AlreadyPending,
}

struct PendingGuard<'a>(&'a AtomicBool);

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) { self.0.store(false, Ordering::SeqCst); }
}

/// Login page controller for one browsing context.
pub struct LoginFlow {
    store: SharedSessionStore,
    navigator: SharedNavigator,
    authenticator: Arc<dyn Authenticator>,
    pending: AtomicBool,
}

impl LoginFlow {
    pub fn new(store: SharedSessionStore, navigator: SharedNavigator, authenticator: Arc<dyn Authenticator>) -> Self {
        Self { store, navigator, authenticator, pending: AtomicBool::new(false) }
    }

    /// Visiting the login page always drops the current session.
    pub fn enter(&self) {
        if let Err(e) = self.store.remove(SessionDomain::Main.key()) {
            warn!(error = %e, "could not clear session on login page");
        }
    }

    fn begin(&self) -> Option<PendingGuard<'_>> {
        self.pending
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| PendingGuard(&self.pending))
    }

    async fn resolve(&self, req: &LoginRequest) -> Result<Identity, LoginOutcome> {
        match self.authenticator.authenticate(req).await {
            Ok(Some(identity)) => Ok(identity),
            Ok(None) => {
                info!(mode = ?req.mode, selector = %req.selector, "login rejected");
                Err(LoginOutcome::Rejected(MSG_REJECTED.to_string()))
            }
            Err(e) => {
                warn!(mode = ?req.mode, error = %e, "login lookup failed");
                Err(LoginOutcome::Failed(MSG_FAILED.to_string()))
            }
        }
    }

    pub async fn submit(&self, req: &LoginRequest) -> LoginOutcome {
        let Some(_guard) = self.begin() else { return LoginOutcome::AlreadyPending; };
        let identity = match self.resolve(req).await {
            Ok(identity) => identity,
            Err(outcome) => return outcome,
        };
        let record = SessionRecord::new(identity.clone());
        if let Err(e) = write_json(self.store.as_ref(), SessionDomain::Main.key(), &record) {
            warn!(error = %e, "could not store session");
            return LoginOutcome::Failed(MSG_FAILED.to_string());
        }
        info!(user = %identity.id, role = identity.role.as_str(), "login ok");
        self.navigator.navigate(Route::Landing(identity.role));
        LoginOutcome::LoggedIn(identity)
    }

    /// Officer transaction-entry login. Lives under its own key with its own lifecycle.
    pub async fn submit_petugas(&self, req: &LoginRequest) -> LoginOutcome {
        let Some(_guard) = self.begin() else { return LoginOutcome::AlreadyPending; };
        let identity = match self.resolve(req).await {
            Ok(identity) => identity,
            Err(outcome) => return outcome,
        };
        if identity.role == Role::Warga {
            info!(user = %identity.id, "petugas login refused for warga account");
            return LoginOutcome::Rejected(MSG_NOT_OFFICER.to_string());
        }
        let record = PetugasLogin::from_identity(&identity);
        if let Err(e) = write_json(self.store.as_ref(), SessionDomain::Petugas.key(), &record) {
            warn!(error = %e, "could not store petugas session");
            return LoginOutcome::Failed(MSG_FAILED.to_string());
        }
        info!(user = %identity.id, "petugas login ok");
        self.navigator.navigate(Route::PetugasTransaksi);
        LoginOutcome::LoggedIn(identity)
    }

    pub fn petugas_session(&self) -> Option<PetugasLogin> {
        read_json::<PetugasLogin>(self.store.as_ref(), SessionDomain::Petugas.key()).ok().flatten()
    }

    /// Ends only the petugas session; the main session is untouched.
    pub fn logout_petugas(&self) {
        if let Err(e) = self.store.remove(SessionDomain::Petugas.key()) {
            warn!(error = %e, "could not clear petugas session");
        }
        self.navigator.navigate(Route::PetugasLogin);
    }
}
