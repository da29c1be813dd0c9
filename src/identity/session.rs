use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::principal::{Identity, Role};

/// Storage key holding the main session.
pub const CURRENT_USER_KEY: &str = "currentUser";
/// Storage key holding the officer transaction-entry session.
pub const PETUGAS_LOGIN_KEY: &str = "petugasLogin";

pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// Independently-lifecycled session slots. Each has its own key and its own expiry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionDomain {
    Main,
    Petugas,
}

impl SessionDomain {
    pub fn key(&self) -> &'static str {
        match self {
            SessionDomain::Main => CURRENT_USER_KEY,
            SessionDomain::Petugas => PETUGAS_LOGIN_KEY,
        }
    }

    pub fn default_policy(&self) -> DomainPolicy {
        match self {
            SessionDomain::Main => DomainPolicy { idle_timeout: Some(DEFAULT_IDLE_TIMEOUT) },
            SessionDomain::Petugas => DomainPolicy { idle_timeout: None },
        }
    }
}

/// `idle_timeout: None` means the domain never expires on inactivity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DomainPolicy {
    pub idle_timeout: Option<Duration>,
}

/// What is persisted under `currentUser`: the identity plus the moment it was stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionRecord {
    #[serde(flatten)]
    pub identity: Identity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl SessionRecord {
    pub fn new(identity: Identity) -> Self {
        Self { identity, created_at: Some(Utc::now()) }
    }
}

/// What is persisted under `petugasLogin`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PetugasLogin {
    pub id: String,
    pub nama: String,
    pub username: String,
    pub role: Role,
    pub login_time: DateTime<Utc>,
}

impl PetugasLogin {
    pub fn from_identity(identity: &Identity) -> Self {
        Self {
            id: identity.id.clone(),
            nama: identity.nama.clone(),
            username: identity.username.clone().unwrap_or_default(),
            role: identity.role,
            login_time: Utc::now(),
        }
    }
}
