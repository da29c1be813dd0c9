use std::sync::Arc;
use std::time::Duration;

use super::*;
use crate::error::StorageError;
use crate::router::{RecordingNavigator, Route};
use crate::storage::{ContextId, LocalStorage, SessionStore, StorageEvents, StorageResult};

const SESSION: &str = r#"{"id":"3","nama":"Admin Sistem","role":"admin"}"#;

fn monitor_for(origin: &LocalStorage) -> (IdleMonitor, Arc<RecordingNavigator>, crate::storage::ContextStorage) {
    let ctx = origin.context();
    let nav = Arc::new(RecordingNavigator::new());
    let m = IdleMonitor::new(SessionDomain::Main, Duration::from_secs(600), Arc::new(ctx.clone()), nav.clone());
    (m, nav, ctx)
}

fn removal(from: ContextId, key: &str) -> StorageEvent {
    StorageEvent { key: key.into(), old_value: Some(SESSION.into()), new_value: None, origin: from }
}

#[test]
fn bootstrap_follows_store() {
    let origin = LocalStorage::in_memory();
    let (mut m, nav, ctx) = monitor_for(&origin);
    m.bootstrap();
    assert_eq!(m.state(), MonitorState::Inactive);
    assert!(!m.timer().is_armed());

    ctx.set("currentUser", SESSION).unwrap();
    m.bootstrap();
    assert_eq!(m.state(), MonitorState::Armed);
    assert!(m.timer().is_armed());
    assert!(nav.history().is_empty());
}

#[test]
fn activity_arms_only_with_a_session() {
    let origin = LocalStorage::in_memory();
    let (mut m, _nav, ctx) = monitor_for(&origin);
    m.bootstrap();
    m.on_activity(ActivityKind::PointerMove);
    assert_eq!(m.state(), MonitorState::Inactive);

    ctx.set("currentUser", SESSION).unwrap();
    m.on_activity(ActivityKind::KeyDown);
    assert_eq!(m.state(), MonitorState::Armed);
}

#[test]
fn unsubscribed_kinds_are_ignored() {
    let origin = LocalStorage::in_memory();
    let (m, _nav, ctx) = monitor_for(&origin);
    let mut m = m.with_sources(ActivitySources::none().with(ActivityKind::KeyDown));
    ctx.set("currentUser", SESSION).unwrap();
    m.on_activity(ActivityKind::Scroll);
    assert_eq!(m.state(), MonitorState::Inactive);
    m.on_activity(ActivityKind::KeyDown);
    assert_eq!(m.state(), MonitorState::Armed);
}

#[test]
fn expiry_clears_and_navigates_once() {
    let origin = LocalStorage::in_memory();
    let (mut m, nav, ctx) = monitor_for(&origin);
    ctx.set("currentUser", SESSION).unwrap();
    m.bootstrap();

    m.on_timer_fired();
    assert_eq!(m.state(), MonitorState::Inactive);
    assert_eq!(ctx.get("currentUser").unwrap(), None);
    assert_eq!(nav.history(), vec![Route::Entry]);

    // stale second firing
    m.on_timer_fired();
    assert_eq!(nav.history(), vec![Route::Entry]);
}

#[test]
fn foreign_removal_forces_logout_from_any_state() {
    let origin = LocalStorage::in_memory();
    let (mut m, nav, ctx) = monitor_for(&origin);
    ctx.set("currentUser", SESSION).unwrap();
    m.bootstrap();
    m.on_storage_event(&removal(ContextId::new(), "currentUser"));
    assert_eq!(m.state(), MonitorState::Inactive);
    assert!(!m.timer().is_armed());
    assert_eq!(nav.current(), Some(Route::Entry));

    m.on_storage_event(&removal(ContextId::new(), "darkMode_user_3"));
    assert_eq!(nav.history().len(), 1);
}

#[test]
fn foreign_login_adopts_session() {
    let origin = LocalStorage::in_memory();
    let (mut m, nav, _ctx) = monitor_for(&origin);
    m.bootstrap();
    let ev = StorageEvent { key: "currentUser".into(), old_value: None, new_value: Some(SESSION.into()), origin: ContextId::new() };
    m.on_storage_event(&ev);
    assert_eq!(m.state(), MonitorState::Armed);
    assert!(nav.history().is_empty());
}

#[test]
fn logout_cancels_before_clearing() {
    let origin = LocalStorage::in_memory();
    let (mut m, nav, ctx) = monitor_for(&origin);
    ctx.set("currentUser", SESSION).unwrap();
    m.bootstrap();
    m.logout();
    assert!(!m.timer().is_armed());
    assert_eq!(ctx.get("currentUser").unwrap(), None);
    m.on_timer_fired();
    assert_eq!(nav.count(Route::Entry), 1);
}

struct BrokenStore;

impl SessionStore for BrokenStore {
    fn get(&self, _key: &str) -> StorageResult<Option<String>> { Ok(Some(SESSION.to_string())) }
    fn set(&self, _key: &str, _value: &str) -> StorageResult<()> { Err(StorageError::Unavailable("quota".into())) }
    fn remove(&self, _key: &str) -> StorageResult<()> { Err(StorageError::Unavailable("quota".into())) }
    fn subscribe(&self) -> StorageEvents {
        let (_tx, rx) = tokio::sync::broadcast::channel(1);
        StorageEvents::new(rx, None)
    }
}

#[test]
fn storage_failure_does_not_block_navigation() {
    let nav = Arc::new(RecordingNavigator::new());
    let mut m = IdleMonitor::new(SessionDomain::Main, Duration::from_secs(600), Arc::new(BrokenStore), nav.clone());
    m.bootstrap();
    assert_eq!(m.state(), MonitorState::Armed);
    m.on_timer_fired();
    assert_eq!(m.state(), MonitorState::Inactive);
    assert_eq!(nav.history(), vec![Route::Entry]);
}

#[test]
fn petugas_monitor_returns_to_petugas_login() {
    let origin = LocalStorage::in_memory();
    let ctx = origin.context();
    let nav = Arc::new(RecordingNavigator::new());
    ctx.set("petugasLogin", "{}").unwrap();
    ctx.set("currentUser", SESSION).unwrap();
    let mut m = IdleMonitor::new(SessionDomain::Petugas, Duration::from_secs(60), Arc::new(ctx.clone()), nav.clone());
    m.bootstrap();
    m.on_timer_fired();
    assert_eq!(nav.history(), vec![Route::PetugasLogin]);
    assert_eq!(ctx.get("petugasLogin").unwrap(), None);
    assert!(ctx.get("currentUser").unwrap().is_some());
}

#[test]
fn missed_events_are_reconciled_against_the_store() {
    let origin = LocalStorage::in_memory();
    let (mut m, nav, ctx) = monitor_for(&origin);
    let other = origin.context();

    other.set("currentUser", SESSION).unwrap();
    m.on_missed_events();
    assert_eq!(m.state(), MonitorState::Armed);
    assert!(nav.history().is_empty());

    // still present: nothing to do
    m.on_missed_events();
    assert_eq!(m.state(), MonitorState::Armed);

    other.remove("currentUser").unwrap();
    m.on_missed_events();
    assert_eq!(m.state(), MonitorState::Inactive);
    assert!(!m.timer().is_armed());
    assert_eq!(nav.history(), vec![Route::Entry]);

    m.on_missed_events();
    assert_eq!(nav.count(Route::Entry), 1);
    assert_eq!(ctx.get("currentUser").unwrap(), None);
}
