use super::{SessionStore, StorageResult};
use crate::identity::Identity;

/// Per-user UI preferences. They outlive logout and are scoped by identity id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefKey {
    Theme,
    DarkMode,
}

impl PrefKey {
    pub fn base(&self) -> &'static str {
        match self {
            PrefKey::Theme => "appTheme",
            PrefKey::DarkMode => "darkMode",
        }
    }

    /// `appTheme_user_<id>` when the identity is known, the bare key otherwise.
    pub fn scoped(&self, who: Option<&Identity>) -> String {
        match who {
            Some(id) => format!("{}_user_{}", self.base(), id.id),
            None => self.base().to_string(),
        }
    }
}

pub struct Preferences<'a> {
    store: &'a dyn SessionStore,
}

impl<'a> Preferences<'a> {
    pub fn new(store: &'a dyn SessionStore) -> Self { Self { store } }

    /// Read a preference: the identity's own key first, then the global default.
    pub fn get(&self, key: PrefKey, who: Option<&Identity>) -> Option<String> {
        let lookup = |k: &str| match self.store.get(k) {
            Ok(v) => v,
            Err(e) => {
                tracing::debug!(key = k, error = %e, "preference read failed");
                None
            }
        };
        if who.is_some() {
            if let Some(v) = lookup(&key.scoped(who)) { return Some(v); }
        }
        lookup(key.base())
    }

    pub fn set(&self, key: PrefKey, who: Option<&Identity>, value: &str) -> StorageResult<()> {
        self.store.set(&key.scoped(who), value)
    }

    pub fn theme(&self, who: Option<&Identity>) -> Option<String> { self.get(PrefKey::Theme, who) }

    pub fn set_theme(&self, who: Option<&Identity>, theme: &str) -> StorageResult<()> { self.set(PrefKey::Theme, who, theme) }

    pub fn dark_mode(&self, who: Option<&Identity>) -> bool {
        self.get(PrefKey::DarkMode, who).map(|v| v == "true").unwrap_or(false)
    }

    pub fn set_dark_mode(&self, who: Option<&Identity>, on: bool) -> StorageResult<()> {
        self.set(PrefKey::DarkMode, who, if on { "true" } else { "false" })
    }
}
