use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::principal::Identity;
use crate::error::AuthError;
use crate::security::{verify_password, UserDirectory, UserRecord};
use crate::tprintln;

/// Which directory field the selector is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoginMode {
    Phone,
    Username,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub mode: LoginMode,
    /// Phone number or username, depending on `mode`.
    pub selector: String,
    pub password: String,
}

impl LoginRequest {
    pub fn phone(no_hp: impl Into<String>, password: impl Into<String>) -> Self {
        Self { mode: LoginMode::Phone, selector: no_hp.into(), password: password.into() }
    }

    pub fn username(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self { mode: LoginMode::Username, selector: username.into(), password: password.into() }
    }
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("mode", &self.mode)
            .field("selector", &self.selector)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Resolves a credential pair to an identity.
///
/// `Ok(None)` means no single active account matched (wrong selector, wrong password,
/// inactive account). `Err` is reserved for the lookup itself failing. Implementations
/// never write the session; the caller commits the returned identity.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, req: &LoginRequest) -> Result<Option<Identity>, AuthError>;
}

pub struct LocalAuthenticator {
    directory: UserDirectory,
}

impl LocalAuthenticator {
    pub fn new(directory: UserDirectory) -> Self { Self { directory } }

    pub fn directory(&self) -> &UserDirectory { &self.directory }

    fn selector_matches(user: &UserRecord, req: &LoginRequest) -> bool {
        let wanted = req.selector.trim();
        if wanted.is_empty() { return false; }
        match req.mode {
            LoginMode::Phone => user.no_hp.as_deref().map(|p| p.trim() == wanted).unwrap_or(false),
            LoginMode::Username => user.username.as_deref().map(|u| u.trim().eq_ignore_ascii_case(wanted)).unwrap_or(false),
        }
    }

    /// Exactly one active account with a matching selector and password, or nothing.
    pub fn resolve(&self, req: &LoginRequest) -> Option<Identity> {
        let mut matches = self
            .directory
            .users()
            .iter()
            .filter(|u| u.status_aktif)
            .filter(|u| Self::selector_matches(u, req))
            .filter(|u| verify_password(&u.password_hash, &req.password));
        let first = matches.next()?;
        if matches.next().is_some() {
            tracing::warn!(mode = ?req.mode, selector = %req.selector, "ambiguous login: more than one active account matches");
            return None;
        }
        Some(first.identity())
    }
}

#[async_trait]
impl Authenticator for LocalAuthenticator {
    async fn authenticate(&self, req: &LoginRequest) -> Result<Option<Identity>, AuthError> {
        let out = self.resolve(req);
        tprintln!("auth.local mode={:?} selector={} matched={}", req.mode, req.selector, out.is_some());
        Ok(out)
    }
}

#[derive(Debug, Deserialize)]
struct RemoteLoginResponse {
    user: Identity,
}

/// Authenticates against the collaborator REST endpoint (`POST <base>/api/auth/login`).
pub struct RemoteAuthenticator {
    base_url: String,
    client: reqwest::Client,
}

impl RemoteAuthenticator {
    pub fn new(base_url: impl Into<String>) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| AuthError::Directory(e.to_string()))?;
        let base_url: String = base_url.into();
        Ok(Self { base_url: base_url.trim_end_matches('/').to_string(), client })
    }

    fn login_url(&self) -> String { format!("{}/api/auth/login", self.base_url) }
}

#[async_trait]
impl Authenticator for RemoteAuthenticator {
    async fn authenticate(&self, req: &LoginRequest) -> Result<Option<Identity>, AuthError> {
        let resp = self
            .client
            .post(self.login_url())
            .json(req)
            .send()
            .await
            .map_err(|e| AuthError::Transient(e.to_string()))?;
        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(AuthError::Transient(format!("login endpoint returned {}", status)));
        }
        let body: RemoteLoginResponse = resp
            .json()
            .await
            .map_err(|e| AuthError::Transient(format!("malformed login response: {}", e)))?;
        if !body.user.status_aktif {
            return Ok(None);
        }
        Ok(Some(body.user))
    }
}
