use serde::{Deserialize, Serialize};

/// Admin role. Two tiers only.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    #[serde(alias = "ADMIN")]
    Admin,
    #[serde(alias = "SUPER_ADMIN")]
    SuperAdmin,
}

/// Something an admin may be allowed to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Create, edit and delete communities, listings, properties, contacts
    ManageContent,
    /// List, create and delete other admin accounts
    ManageAdmins,
    /// Change site-wide settings
    ManageSettings,
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Capability::ManageContent => "manage content",
            Capability::ManageAdmins => "manage admins",
            Capability::ManageSettings => "manage settings",
        };
        f.write_str(name)
    }
}

impl Role {
    pub fn has_capability(self, capability: Capability) -> bool {
        match capability {
            Capability::ManageContent => true,
            Capability::ManageAdmins | Capability::ManageSettings => self == Role::SuperAdmin,
        }
    }
}

/// Profile of a logged-in admin
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AdminUser {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub role: Role,
}

impl AdminUser {
    pub fn has_capability(&self, capability: Capability) -> bool {
        self.role.has_capability(capability)
    }
}

/// Body of a successful `POST /admin/login`
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub admin: AdminUser,
}

/// Payload for creating another admin account
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAdminUser {
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub role: Role,
}
