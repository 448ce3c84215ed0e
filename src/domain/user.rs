//! User domain entity and the directory enumerations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Organisational department of a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Department {
    Itsg,
    Sre,
    Hr,
    Ssed,
    Finance,
}

impl Department {
    pub const ALL: [Department; 5] = [
        Department::Itsg,
        Department::Sre,
        Department::Hr,
        Department::Ssed,
        Department::Finance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Department::Itsg => "ITSG",
            Department::Sre => "SRE",
            Department::Hr => "HR",
            Department::Ssed => "SSED",
            Department::Finance => "FINANCE",
        }
    }
}

/// Role of a user within their department
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Employee,
    Manager,
    TeamLead,
    Admin,
    AccountOwner,
    Finance,
}

impl Role {
    pub const ALL: [Role; 6] = [
        Role::Employee,
        Role::Manager,
        Role::TeamLead,
        Role::Admin,
        Role::AccountOwner,
        Role::Finance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Employee => "EMPLOYEE",
            Role::Manager => "MANAGER",
            Role::TeamLead => "TEAM_LEAD",
            Role::Admin => "ADMIN",
            Role::AccountOwner => "ACCOUNT_OWNER",
            Role::Finance => "FINANCE",
        }
    }
}

/// Error for role/department strings outside the enumerations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! string_enum {
    ($ty:ty, $kind:literal) => {
        impl std::str::FromStr for $ty {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                <$ty>::ALL
                    .into_iter()
                    .find(|v| v.as_str() == s)
                    .ok_or_else(|| UnknownVariant {
                        kind: $kind,
                        value: s.to_string(),
                    })
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

string_enum!(Department, "department");
string_enum!(Role, "role");

/// User domain entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub department: Department,
    pub role: Role,
    pub manager_id: Option<Uuid>,
    pub added_by: Option<Uuid>,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

/// Fields required to persist a new user (already validated and hashed)
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub department: Department,
    pub role: Role,
    pub manager_id: Option<Uuid>,
    pub added_by: Option<Uuid>,
    pub password_hash: String,
}

/// Minimal user reference used in relations and dropdowns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// Directory row returned by the scoped search dropdown
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DirectoryEntry {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub department: Department,
    pub role: Role,
}

impl From<User> for DirectoryEntry {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            department: user.department,
            role: user.role,
        }
    }
}

/// User response (safe to return to client)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,
    #[schema(example = "Ada Lovelace")]
    pub name: String,
    #[schema(example = "ada@example.com")]
    pub email: String,
    pub department: Department,
    pub role: Role,
    pub manager: Option<UserSummary>,
    pub added_by: Option<UserSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserResponse {
    pub fn new(user: User, manager: Option<UserSummary>, added_by: Option<UserSummary>) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            department: user.department,
            role: user.role,
            manager,
            added_by,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self::new(user, None, None)
    }
}
