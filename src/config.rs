//! Process configuration read from `DANAWARGA_*` environment variables.

use std::path::PathBuf;
use std::time::Duration;

use crate::identity::{DomainPolicy, SessionDomain, DEFAULT_IDLE_TIMEOUT};

pub const DEFAULT_HTTP_PORT: u16 = 7878;
pub const DEFAULT_DATA_DIR: &str = "data";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub http_port: u16,
    pub data_dir: PathBuf,
    pub users_file: PathBuf,
    pub idle_timeout: Duration,
    /// `None` leaves the petugas session without inactivity expiry.
    pub petugas_idle_timeout: Option<Duration>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let data_dir = PathBuf::from(DEFAULT_DATA_DIR);
        Self {
            http_port: DEFAULT_HTTP_PORT,
            users_file: data_dir.join("users.json"),
            data_dir,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            petugas_idle_timeout: None,
        }
    }
}

fn parse_or_default<T: std::str::FromStr>(name: &str, raw: Option<String>, default: T) -> T {
    match raw {
        None => default,
        Some(s) => match s.trim().parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                tracing::warn!(var = name, value = %s, "ignoring unparsable configuration value");
                default
            }
        },
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Build from an arbitrary variable source; `from_env` passes the process environment.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let d = Self::default();
        let http_port = parse_or_default("DANAWARGA_HTTP_PORT", get("DANAWARGA_HTTP_PORT"), d.http_port);
        let data_dir = get("DANAWARGA_DATA_DIR").map(PathBuf::from).unwrap_or(d.data_dir);
        let users_file = get("DANAWARGA_USERS_FILE").map(PathBuf::from).unwrap_or_else(|| data_dir.join("users.json"));
        let mut idle_secs = parse_or_default("DANAWARGA_IDLE_TIMEOUT_SECS", get("DANAWARGA_IDLE_TIMEOUT_SECS"), d.idle_timeout.as_secs());
        if idle_secs == 0 {
            // the main session always expires; zero would log out on arming
            tracing::warn!(var = "DANAWARGA_IDLE_TIMEOUT_SECS", "zero idle timeout rejected; using default");
            idle_secs = d.idle_timeout.as_secs();
        }
        let petugas_secs: Option<u64> = get("DANAWARGA_PETUGAS_IDLE_TIMEOUT_SECS")
            .and_then(|s| match s.trim().parse::<u64>() {
                Ok(v) => Some(v),
                Err(_) => {
                    tracing::warn!(var = "DANAWARGA_PETUGAS_IDLE_TIMEOUT_SECS", value = %s, "ignoring unparsable configuration value");
                    None
                }
            });
        Self {
            http_port,
            data_dir,
            users_file,
            idle_timeout: Duration::from_secs(idle_secs),
            // zero disables expiry as well
            petugas_idle_timeout: petugas_secs.filter(|s| *s > 0).map(Duration::from_secs),
        }
    }

    pub fn policy_for(&self, domain: SessionDomain) -> DomainPolicy {
        match domain {
            SessionDomain::Main => DomainPolicy { idle_timeout: Some(self.idle_timeout) },
            SessionDomain::Petugas => DomainPolicy { idle_timeout: self.petugas_idle_timeout },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let m: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |k: &str| m.get(k).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let c = AppConfig::from_lookup(lookup(&[]));
        assert_eq!(c, AppConfig::default());
        assert_eq!(c.policy_for(SessionDomain::Main).idle_timeout, Some(Duration::from_secs(600)));
        assert_eq!(c.policy_for(SessionDomain::Petugas).idle_timeout, None);
    }

    #[test]
    fn overrides_and_derived_users_file() {
        let c = AppConfig::from_lookup(lookup(&[
            ("DANAWARGA_HTTP_PORT", "9000"),
            ("DANAWARGA_DATA_DIR", "/var/lib/danawarga"),
            ("DANAWARGA_IDLE_TIMEOUT_SECS", "120"),
            ("DANAWARGA_PETUGAS_IDLE_TIMEOUT_SECS", "1800"),
        ]));
        assert_eq!(c.http_port, 9000);
        assert_eq!(c.users_file, PathBuf::from("/var/lib/danawarga/users.json"));
        assert_eq!(c.idle_timeout, Duration::from_secs(120));
        assert_eq!(c.policy_for(SessionDomain::Petugas).idle_timeout, Some(Duration::from_secs(1800)));
    }

    #[test]
    fn garbage_falls_back() {
        let c = AppConfig::from_lookup(lookup(&[
            ("DANAWARGA_HTTP_PORT", "eighty"),
            ("DANAWARGA_PETUGAS_IDLE_TIMEOUT_SECS", "0"),
        ]));
        assert_eq!(c.http_port, DEFAULT_HTTP_PORT);
        assert_eq!(c.petugas_idle_timeout, None);
    }

    #[test]
    fn zero_main_timeout_keeps_default() {
        let c = AppConfig::from_lookup(lookup(&[("DANAWARGA_IDLE_TIMEOUT_SECS", "0")]));
        assert_eq!(c.idle_timeout, DEFAULT_IDLE_TIMEOUT);
        assert_eq!(c.policy_for(SessionDomain::Main).idle_timeout, Some(Duration::from_secs(600)));
    }
}
