//! One browsing context (tab/window): its storage handle, navigator, login page controller
//! and the idle monitors for each session domain whose policy expires on inactivity.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::config::AppConfig;
use crate::identity::{Authenticator, DomainPolicy, LoginRequest, SessionDomain};
use crate::monitor::{ActivityKind, IdleMonitor, MonitorHandle, MonitorState};
use crate::router::{page_session, LoginFlow, LoginOutcome, PageSession, RecordingNavigator, SharedNavigator};
use crate::storage::{ContextId, ContextStorage, LocalStorage, Preferences, SharedSessionStore};

pub struct BrowsingContext {
    id: ContextId,
    storage: ContextStorage,
    navigator: SharedNavigator,
    login: LoginFlow,
    main: MonitorHandle,
    petugas: Option<MonitorHandle>,
    tasks: Vec<JoinHandle<()>>,
}

impl BrowsingContext {
    /// Open a context on `origin`. Must be called inside a tokio runtime.
    pub fn open(
        origin: &LocalStorage,
        navigator: SharedNavigator,
        authenticator: Arc<dyn Authenticator>,
        main_policy: DomainPolicy,
        petugas_policy: DomainPolicy,
    ) -> Self {
        let storage = origin.context();
        let store: SharedSessionStore = Arc::new(storage.clone());
        let mut tasks = Vec::new();

        let main_timeout = main_policy.idle_timeout.unwrap_or(crate::identity::DEFAULT_IDLE_TIMEOUT);
        let (main, t) = IdleMonitor::new(SessionDomain::Main, main_timeout, store.clone(), navigator.clone()).spawn();
        tasks.push(t);

        let petugas = petugas_policy.idle_timeout.map(|timeout| {
            let (h, t) = IdleMonitor::new(SessionDomain::Petugas, timeout, store.clone(), navigator.clone()).spawn();
            tasks.push(t);
            h
        });

        let login = LoginFlow::new(store, navigator.clone(), authenticator);
        tracing::debug!(context = %storage.id(), petugas_expiry = petugas.is_some(), "browsing context opened");
        Self { id: storage.id(), storage, navigator, login, main, petugas, tasks }
    }

    pub fn with_config(origin: &LocalStorage, authenticator: Arc<dyn Authenticator>, config: &AppConfig) -> (Self, Arc<RecordingNavigator>) {
        let nav = Arc::new(RecordingNavigator::new());
        let ctx = Self::open(
            origin,
            nav.clone(),
            authenticator,
            config.policy_for(SessionDomain::Main),
            config.policy_for(SessionDomain::Petugas),
        );
        (ctx, nav)
    }

    pub fn id(&self) -> ContextId { self.id }

    pub fn storage(&self) -> &ContextStorage { &self.storage }

    pub fn navigator(&self) -> &SharedNavigator { &self.navigator }

    pub fn preferences(&self) -> Preferences<'_> { Preferences::new(&self.storage) }

    pub fn monitor(&self) -> &MonitorHandle { &self.main }

    pub fn petugas_monitor(&self) -> Option<&MonitorHandle> { self.petugas.as_ref() }

    pub fn state(&self) -> MonitorState { self.main.state() }

    /// Fan one interaction out to every monitor of this context.
    pub fn activity(&self, kind: ActivityKind) {
        self.main.activity(kind);
        if let Some(p) = &self.petugas { p.activity(kind); }
    }

    pub fn enter_login_page(&self) {
        self.login.enter();
        // no foreign event for our own removal; let the monitor see the empty store
        self.main.resync();
    }

    pub async fn login(&self, req: &LoginRequest) -> LoginOutcome {
        let out = self.login.submit(req).await;
        if matches!(out, LoginOutcome::LoggedIn(_)) {
            // the landing page mounts and starts watching the fresh session
            self.main.resync();
        }
        out
    }

    pub async fn login_petugas(&self, req: &LoginRequest) -> LoginOutcome {
        let out = self.login.submit_petugas(req).await;
        if let (LoginOutcome::LoggedIn(_), Some(p)) = (&out, &self.petugas) {
            p.resync();
        }
        out
    }

    pub fn login_flow(&self) -> &LoginFlow { &self.login }

    pub async fn logout(&self) { self.main.logout().await; }

    pub async fn logout_petugas(&self) {
        match &self.petugas {
            Some(p) => p.logout().await,
            None => self.login.logout_petugas(),
        }
    }

    pub fn page_session(&self) -> PageSession { page_session(&self.storage) }

    /// Stop the monitors and wait for their tasks.
    pub async fn close(self) {
        self.main.shutdown();
        if let Some(p) = &self.petugas { p.shutdown(); }
        for t in self.tasks {
            let _ = t.await;
        }
        tracing::debug!(context = %self.id, "browsing context closed");
    }
}
