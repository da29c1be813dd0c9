use serde::{Deserialize, Serialize};

/// Closed set of roles an account can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Warga,
    Petugas,
    Admin,
    SuperAdmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Warga => "warga",
            Role::Petugas => "petugas",
            Role::Admin => "admin",
            Role::SuperAdmin => "super_admin",
        }
    }

    pub fn is_admin(&self) -> bool { matches!(self, Role::Admin | Role::SuperAdmin) }

    /// Dashboard a freshly logged-in account lands on.
    pub fn landing_route(&self) -> &'static str {
        match self {
            Role::Warga => "/dashboard/warga",
            Role::Petugas => "/dashboard/petugas",
            Role::Admin | Role::SuperAdmin => "/dashboard/admin",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "warga" => Ok(Role::Warga),
            "petugas" => Ok(Role::Petugas),
            "admin" => Ok(Role::Admin),
            "super_admin" | "superadmin" => Ok(Role::SuperAdmin),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

fn default_aktif() -> bool { true }

/// The authenticated subject. This is what `currentUser` holds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Identity {
    pub id: String,
    pub nama: String,
    pub role: Role,
    #[serde(default = "default_aktif")]
    pub status_aktif: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_hp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kelompok_id: Option<String>,
}

impl Identity {
    pub fn new(id: impl Into<String>, nama: impl Into<String>, role: Role) -> Self {
        Self { id: id.into(), nama: nama.into(), role, status_aktif: true, no_hp: None, username: None, kelompok_id: None }
    }
}
