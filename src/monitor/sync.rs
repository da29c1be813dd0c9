use crate::identity::SessionDomain;
use crate::storage::StorageEvent;

/// What a context does about a session change made by another context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    /// Session removed elsewhere: leave immediately, whatever the local timer says.
    ForceLogout,
    /// Session written elsewhere (fresh login or overwrite): adopt its liveness window.
    Adopt,
    Ignore,
}

/// Classifies foreign storage changes for one session domain.
/// No context is authoritative; whichever one removes the key propagates the logout.
#[derive(Debug, Clone, Copy)]
pub struct SessionSynchronizer {
    domain: SessionDomain,
}

impl SessionSynchronizer {
    pub fn new(domain: SessionDomain) -> Self { Self { domain } }

    pub fn domain(&self) -> SessionDomain { self.domain }

    pub fn classify(&self, ev: &StorageEvent) -> SyncAction {
        if ev.key != self.domain.key() {
            return SyncAction::Ignore;
        }
        match ev.new_value {
            None => SyncAction::ForceLogout,
            Some(_) => SyncAction::Adopt,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::ContextId;

    fn ev(key: &str, new_value: Option<&str>) -> StorageEvent {
        StorageEvent { key: key.into(), old_value: Some("{}".into()), new_value: new_value.map(Into::into), origin: ContextId::new() }
    }

    #[test]
    fn removal_forces_logout() {
        let s = SessionSynchronizer::new(SessionDomain::Main);
        assert_eq!(s.classify(&ev("currentUser", None)), SyncAction::ForceLogout);
        assert_eq!(s.classify(&ev("currentUser", Some("{\"id\":\"9\"}"))), SyncAction::Adopt);
    }

    #[test]
    fn other_keys_and_domains_are_ignored() {
        let main = SessionSynchronizer::new(SessionDomain::Main);
        assert_eq!(main.classify(&ev("darkMode_user_3", None)), SyncAction::Ignore);
        assert_eq!(main.classify(&ev("petugasLogin", None)), SyncAction::Ignore);
        let petugas = SessionSynchronizer::new(SessionDomain::Petugas);
        assert_eq!(petugas.classify(&ev("petugasLogin", None)), SyncAction::ForceLogout);
        assert_eq!(petugas.classify(&ev("currentUser", None)), SyncAction::Ignore);
    }
}
