//! Authenticated caller identity.
//!
//! A `Session` is resolved once per request by the auth middleware and
//! passed explicitly into every service call.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{Department, Role};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Session {
    pub user_id: Uuid,
    pub email: String,
    /// `None` when the provider sent a role outside the enumeration
    pub role: Option<Role>,
    /// `None` when the provider sent a department outside the enumeration
    pub department: Option<Department>,
}

impl Session {
    /// Build a session from raw metadata strings. Unknown values become
    /// `None` so that no policy rule can match them.
    pub fn from_metadata(user_id: Uuid, email: String, role: &str, department: &str) -> Self {
        let role = role.parse().ok();
        let department = department.parse().ok();
        if role.is_none() || department.is_none() {
            tracing::warn!(user_id = %user_id, "session carries unrecognised role or department");
        }
        Self {
            user_id,
            email,
            role,
            department,
        }
    }

    pub fn is_department(&self, department: Department) -> bool {
        self.department == Some(department)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_metadata_parsed() {
        let s = Session::from_metadata(Uuid::new_v4(), "a@b.c".into(), "MANAGER", "ITSG");
        assert_eq!(s.role, Some(Role::Manager));
        assert!(s.is_department(Department::Itsg));
    }

    #[test]
    fn test_unknown_metadata_is_none() {
        let s = Session::from_metadata(Uuid::new_v4(), "a@b.c".into(), "root", "itsg");
        assert_eq!(s.role, None);
        assert_eq!(s.department, None);
        assert!(!s.is_department(Department::Itsg));
    }
}
