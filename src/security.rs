//! User directory and password hashing.
//!
//! The directory is the set of accounts a `LocalAuthenticator` resolves logins against.
//! It is kept as a JSON array on disk (`users.json`) and held in memory once loaded.
//! Passwords are stored as Argon2 PHC strings only.

use anyhow::{Context, Result, anyhow};
use std::path::Path;
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use password_hash::{SaltString, PasswordHash};
use serde::{Deserialize, Serialize};

use crate::identity::{Identity, Role};

pub fn hash_password(password: &str) -> Result<String> {
    let mut salt_bytes = [0u8; 16];
    getrandom::getrandom(&mut salt_bytes).map_err(|e| anyhow!(e.to_string()))?;
    let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| anyhow!(e.to_string()))?;
    let argon2 = Argon2::default();
    let phc = argon2.hash_password(password.as_bytes(), &salt).map_err(|e| anyhow!(e.to_string()))?.to_string();
    Ok(phc)
}

pub fn verify_password(hash: &str, password: &str) -> bool {
    if let Ok(parsed) = PasswordHash::new(hash) {
        let argon2 = Argon2::default();
        argon2.verify_password(password.as_bytes(), &parsed).is_ok()
    } else { false }
}

fn default_aktif() -> bool { true }

/// One account row as stored in the directory file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserRecord {
    pub id: String,
    pub nama: String,
    pub role: Role,
    #[serde(default = "default_aktif")]
    pub status_aktif: bool,
    #[serde(default)]
    pub no_hp: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub kelompok_id: Option<String>,
    pub password_hash: String,
}

impl UserRecord {
    pub fn identity(&self) -> Identity {
        Identity {
            id: self.id.clone(),
            nama: self.nama.clone(),
            role: self.role,
            status_aktif: self.status_aktif,
            no_hp: self.no_hp.clone(),
            username: self.username.clone(),
            kelompok_id: self.kelompok_id.clone(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    users: Vec<UserRecord>,
}

impl UserDirectory {
    pub fn new(users: Vec<UserRecord>) -> Self { Self { users } }

    /// Load `users.json`. A missing file yields an empty directory.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::warn!(path = %path.display(), "user directory file not found; starting empty");
            return Ok(Self::default());
        }
        let bytes = std::fs::read(path)?;
        let users: Vec<UserRecord> = serde_json::from_slice(&bytes)
            .map_err(|e| anyhow!("invalid user directory {}: {}", path.display(), e))?;
        tracing::info!(path = %path.display(), users = users.len(), "user directory loaded");
        Ok(Self { users })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create user directory folder: {}", dir.display()))?;
        }
        std::fs::write(path, serde_json::to_vec_pretty(&self.users)?)
            .with_context(|| format!("Failed to write user directory: {}", path.display()))?;
        Ok(())
    }

    /// Add or replace (by id) an account, hashing the given password.
    pub fn add_user(&mut self, identity: &Identity, password: &str) -> Result<()> {
        let hash = hash_password(password)?;
        self.users.retain(|u| u.id != identity.id);
        self.users.push(UserRecord {
            id: identity.id.clone(),
            nama: identity.nama.clone(),
            role: identity.role,
            status_aktif: identity.status_aktif,
            no_hp: identity.no_hp.clone(),
            username: identity.username.clone(),
            kelompok_id: identity.kelompok_id.clone(),
            password_hash: hash,
        });
        Ok(())
    }

    pub fn users(&self) -> &[UserRecord] { &self.users }
    pub fn len(&self) -> usize { self.users.len() }
    pub fn is_empty(&self) -> bool { self.users.is_empty() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let phc = hash_password("jimpitan").unwrap();
        assert!(phc.starts_with("$argon2"));
        assert!(verify_password(&phc, "jimpitan"));
        assert!(!verify_password(&phc, "Jimpitan"));
    }

    #[test]
    fn plain_text_hash_never_verifies() {
        assert!(!verify_password("rahasia", "rahasia"));
    }

    #[test]
    fn missing_file_is_empty_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = UserDirectory::load(&tmp.path().join("users.json")).unwrap();
        assert!(dir.is_empty());
    }

    #[test]
    fn save_and_reload() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("users.json");
        let mut dir = UserDirectory::default();
        let mut id = Identity::new("7", "Budi", Role::Petugas);
        id.username = Some("budi".into());
        dir.add_user(&id, "ronda").unwrap();
        dir.save(&path).unwrap();
        let loaded = UserDirectory::load(&path).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.users()[0].identity(), id);
    }

    #[test]
    fn save_reports_the_folder_it_could_not_create() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("data");
        std::fs::write(&blocker, b"not a folder").unwrap();
        let err = UserDirectory::default().save(&blocker.join("users.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to create user directory folder"), "{}", err);
        assert!(err.to_string().contains("data"), "{}", err);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("users.json");
        std::fs::write(&path, b"{not json").unwrap();
        assert!(UserDirectory::load(&path).is_err());
    }
}
