//! Centralized authorization policy.
//!
//! Every operation exposed by the API has exactly one row in [`POLICY`],
//! mapping the caller's role and department to allow/deny. Handlers never
//! compare role or department strings themselves.

use uuid::Uuid;

use crate::domain::{Department, Role, Session};
use crate::errors::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateUser,
    ListUsers,
    ViewUser,
    SearchDirectory,
    ListManagers,
    ViewProcurement,
    ViewLicenses,
    ViewLicenseDropdowns,
    ManageLicenseKeys,
    ViewLicenseLogs,
    ReadOwnNotifications,
    CreateNotification,
    MarkNotificationRead,
}

/// Condition a session must satisfy
#[derive(Debug, Clone, Copy)]
pub enum Requirement {
    Authenticated,
    Department(&'static [Department]),
    Role(&'static [Role]),
    AllOf(&'static [Requirement]),
    AnyOf(&'static [Requirement]),
}

impl Requirement {
    pub fn is_satisfied_by(&self, session: &Session) -> bool {
        match self {
            Requirement::Authenticated => true,
            Requirement::Department(allowed) => session
                .department
                .is_some_and(|d| allowed.contains(&d)),
            Requirement::Role(allowed) => session.role.is_some_and(|r| allowed.contains(&r)),
            Requirement::AllOf(all) => all.iter().all(|r| r.is_satisfied_by(session)),
            Requirement::AnyOf(any) => any.iter().any(|r| r.is_satisfied_by(session)),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub operation: Operation,
    pub requirement: Requirement,
    /// Rendered after `Forbidden: ` when the rule denies
    pub description: &'static str,
}

const ITSG_ONLY: Requirement = Requirement::Department(&[Department::Itsg]);

const LICENSE_STAFF: Requirement = Requirement::AnyOf(&[
    Requirement::Department(&[Department::Itsg]),
    Requirement::Role(&[Role::Admin, Role::AccountOwner]),
]);

pub const POLICY: &[Rule] = &[
    Rule {
        operation: Operation::CreateUser,
        requirement: ITSG_ONLY,
        description: "only ITSG may create users",
    },
    Rule {
        operation: Operation::ListUsers,
        requirement: ITSG_ONLY,
        description: "only ITSG may list all users",
    },
    Rule {
        operation: Operation::ViewUser,
        requirement: ITSG_ONLY,
        description: "only ITSG may view other users",
    },
    Rule {
        operation: Operation::SearchDirectory,
        requirement: Requirement::Authenticated,
        description: "directory search requires a session",
    },
    Rule {
        operation: Operation::ListManagers,
        requirement: Requirement::Authenticated,
        description: "manager list requires a session",
    },
    Rule {
        operation: Operation::ViewProcurement,
        requirement: Requirement::AllOf(&[
            Requirement::Role(&[Role::Manager, Role::TeamLead]),
            Requirement::Department(&[Department::Itsg, Department::Finance]),
        ]),
        description: "procurement is limited to MANAGER or TEAM_LEAD in ITSG or FINANCE",
    },
    Rule {
        operation: Operation::ViewLicenses,
        requirement: LICENSE_STAFF,
        description: "licenses are limited to ITSG, ADMIN or ACCOUNT_OWNER",
    },
    Rule {
        operation: Operation::ViewLicenseDropdowns,
        requirement: Requirement::Authenticated,
        description: "license dropdowns require a session",
    },
    Rule {
        operation: Operation::ManageLicenseKeys,
        requirement: LICENSE_STAFF,
        description: "license keys may only be managed by ITSG, ADMIN or ACCOUNT_OWNER",
    },
    Rule {
        operation: Operation::ViewLicenseLogs,
        requirement: LICENSE_STAFF,
        description: "license logs are limited to ITSG, ADMIN or ACCOUNT_OWNER",
    },
    Rule {
        operation: Operation::ReadOwnNotifications,
        requirement: Requirement::Authenticated,
        description: "notifications require a session",
    },
    Rule {
        operation: Operation::CreateNotification,
        requirement: Requirement::AnyOf(&[
            Requirement::Department(&[Department::Itsg]),
            Requirement::Role(&[Role::Admin]),
        ]),
        description: "only ITSG or ADMIN may send notifications",
    },
    Rule {
        operation: Operation::MarkNotificationRead,
        requirement: Requirement::Authenticated,
        description: "notifications require a session",
    },
];

/// Look up the rule for an operation.
pub fn rule_for(operation: Operation) -> Option<&'static Rule> {
    POLICY.iter().find(|r| r.operation == operation)
}

/// Allow or deny `operation` for `session`.
///
/// An operation without a rule is denied.
pub fn authorize(session: &Session, operation: Operation) -> AppResult<()> {
    let Some(rule) = rule_for(operation) else {
        tracing::error!(?operation, "no policy rule registered");
        return Err(AppError::forbidden("operation not permitted"));
    };

    if rule.requirement.is_satisfied_by(session) {
        Ok(())
    } else {
        tracing::info!(
            user_id = %session.user_id,
            ?operation,
            role = ?session.role,
            department = ?session.department,
            "policy denied request"
        );
        Err(AppError::forbidden(rule.description))
    }
}

/// Viewing a single user: always allowed for one's own record.
pub fn authorize_view_user(session: &Session, target: Uuid) -> AppResult<()> {
    if session.user_id == target {
        return Ok(());
    }
    authorize(session, Operation::ViewUser)
}

/// Ownership check applied after a resource has been loaded.
pub fn ensure_owner(session: &Session, owner: Uuid, what: &str) -> AppResult<()> {
    if session.user_id == owner {
        Ok(())
    } else {
        Err(AppError::forbidden(format!("{} belongs to another user", what)))
    }
}

/// Which slice of the user directory a caller may search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryScope {
    All,
    Department(Department),
}

impl DirectoryScope {
    pub fn department(&self) -> Option<Department> {
        match self {
            DirectoryScope::All => None,
            DirectoryScope::Department(d) => Some(*d),
        }
    }
}

/// ITSG searches the whole directory; everyone else only their own department.
pub fn directory_scope(session: &Session) -> AppResult<DirectoryScope> {
    authorize(session, Operation::SearchDirectory)?;
    if session.is_department(Department::Itsg) {
        return Ok(DirectoryScope::All);
    }
    match session.department {
        Some(department) => Ok(DirectoryScope::Department(department)),
        None => Err(AppError::forbidden(
            "directory search requires a recognised department",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    fn session(role: Role, department: Department) -> Session {
        Session {
            user_id: Uuid::new_v4(),
            email: "caller@example.com".to_string(),
            role: Some(role),
            department: Some(department),
        }
    }

    #[test]
    fn test_every_operation_has_a_rule() {
        use Operation::*;
        for op in [
            CreateUser,
            ListUsers,
            ViewUser,
            SearchDirectory,
            ListManagers,
            ViewProcurement,
            ViewLicenses,
            ViewLicenseDropdowns,
            ManageLicenseKeys,
            ViewLicenseLogs,
            ReadOwnNotifications,
            CreateNotification,
            MarkNotificationRead,
        ] {
            assert!(rule_for(op).is_some(), "missing rule for {:?}", op);
        }
    }

    #[test]
    fn test_create_user_requires_itsg() {
        assert!(authorize(&session(Role::Employee, Department::Itsg), Operation::CreateUser).is_ok());
        let err = authorize(&session(Role::Admin, Department::Hr), Operation::CreateUser).unwrap_err();
        assert_eq!(err.to_string(), "Forbidden: only ITSG may create users");
    }

    #[test]
    fn test_procurement_requires_role_and_department() {
        let allowed = [
            (Role::Manager, Department::Itsg),
            (Role::Manager, Department::Finance),
            (Role::TeamLead, Department::Itsg),
            (Role::TeamLead, Department::Finance),
        ];
        for (role, dept) in allowed {
            assert!(authorize(&session(role, dept), Operation::ViewProcurement).is_ok());
        }

        let denied = [
            (Role::Employee, Department::Itsg),
            (Role::Admin, Department::Finance),
            (Role::Manager, Department::Hr),
            (Role::TeamLead, Department::Sre),
        ];
        for (role, dept) in denied {
            assert!(matches!(
                authorize(&session(role, dept), Operation::ViewProcurement),
                Err(AppError::Forbidden(_))
            ));
        }
    }

    #[test]
    fn test_license_key_mutations_share_one_rule() {
        assert_ok!(authorize(&session(Role::Employee, Department::Itsg), Operation::ManageLicenseKeys));
        assert_ok!(authorize(&session(Role::AccountOwner, Department::Hr), Operation::ManageLicenseKeys));
        assert_err!(authorize(&session(Role::Manager, Department::Sre), Operation::ManageLicenseKeys));
    }

    #[test]
    fn test_unknown_claims_fail_closed() {
        let s = Session {
            user_id: Uuid::new_v4(),
            email: "x@example.com".to_string(),
            role: None,
            department: None,
        };
        assert!(authorize(&s, Operation::CreateUser).is_err());
        assert!(authorize(&s, Operation::ViewLicenses).is_err());
        assert!(directory_scope(&s).is_err());
        assert!(authorize(&s, Operation::ReadOwnNotifications).is_ok());
    }

    #[test]
    fn test_directory_scope() {
        assert_eq!(
            directory_scope(&session(Role::Employee, Department::Itsg)).unwrap(),
            DirectoryScope::All
        );
        assert_eq!(
            directory_scope(&session(Role::Admin, Department::Hr)).unwrap(),
            DirectoryScope::Department(Department::Hr)
        );
    }

    #[test]
    fn test_view_own_user_always_allowed() {
        let s = session(Role::Employee, Department::Sre);
        assert_ok!(authorize_view_user(&s, s.user_id));
        assert_err!(authorize_view_user(&s, Uuid::new_v4()));
    }

    #[test]
    fn test_ensure_owner() {
        let s = session(Role::Employee, Department::Sre);
        assert!(ensure_owner(&s, s.user_id, "notification").is_ok());
        let err = ensure_owner(&s, Uuid::new_v4(), "notification").unwrap_err();
        assert_eq!(err.to_string(), "Forbidden: notification belongs to another user");
    }
}
