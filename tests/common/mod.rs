#![allow(dead_code)]
//! Shared fixtures: a small user directory with cheap Argon2 parameters.

use std::sync::Arc;

use argon2::{Algorithm, Argon2, Params, PasswordHasher, Version};
use password_hash::SaltString;

use danawarga::identity::{Authenticator, LocalAuthenticator, Role};
use danawarga::security::{UserDirectory, UserRecord};

pub const WARGA_HP: &str = "081234567890";
pub const WARGA_PW: &str = "warga123";
pub const PETUGAS_USER: &str = "budi";
pub const PETUGAS_PW: &str = "ronda";
pub const ADMIN_USER: &str = "admin";
pub const ADMIN_PW: &str = "admin123";
pub const INACTIVE_HP: &str = "081299999999";

// Test-strength Argon2 so fixtures stay fast; verification reads params from the PHC string.
pub fn phc_for(password: &str) -> String {
    let mut salt_bytes = [0u8; 16];
    getrandom::getrandom(&mut salt_bytes).expect("salt");
    let salt = SaltString::encode_b64(&salt_bytes).expect("salt b64");
    let params = Params::new(1024, 1, 1, None).expect("params");
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
    argon2.hash_password(password.as_bytes(), &salt).unwrap().to_string()
}

fn user(id: &str, nama: &str, role: Role, aktif: bool, no_hp: Option<&str>, username: Option<&str>, pw: &str) -> UserRecord {
    UserRecord {
        id: id.into(),
        nama: nama.into(),
        role,
        status_aktif: aktif,
        no_hp: no_hp.map(Into::into),
        username: username.map(Into::into),
        kelompok_id: None,
        password_hash: phc_for(pw),
    }
}

pub fn directory() -> UserDirectory {
    UserDirectory::new(vec![
        user("1", "Siti Aminah", Role::Warga, true, Some(WARGA_HP), None, WARGA_PW),
        user("2", "Budi Santoso", Role::Petugas, true, Some("081200000002"), Some(PETUGAS_USER), PETUGAS_PW),
        user("3", "Admin Sistem", Role::Admin, true, None, Some(ADMIN_USER), ADMIN_PW),
        user("4", "Warga Pindah", Role::Warga, false, Some(INACTIVE_HP), None, "pindah"),
        user("5", "Kembar Satu", Role::Warga, true, None, Some("kembar"), "sama"),
        user("6", "Kembar Dua", Role::Warga, true, None, Some("kembar"), "sama"),
    ])
}

pub fn authenticator() -> Arc<dyn Authenticator> {
    Arc::new(LocalAuthenticator::new(directory()))
}
