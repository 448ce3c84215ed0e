//! Procurement request entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::UserSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcurementStatus {
    Pending,
    Approved,
    Rejected,
    Completed,
}

impl ProcurementStatus {
    pub const ALL: [ProcurementStatus; 4] = [
        ProcurementStatus::Pending,
        ProcurementStatus::Approved,
        ProcurementStatus::Rejected,
        ProcurementStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProcurementStatus::Pending => "PENDING",
            ProcurementStatus::Approved => "APPROVED",
            ProcurementStatus::Rejected => "REJECTED",
            ProcurementStatus::Completed => "COMPLETED",
        }
    }

    /// Archived requests are the completed ones
    pub fn is_archived(&self) -> bool {
        matches!(self, ProcurementStatus::Completed)
    }
}

impl std::str::FromStr for ProcurementStatus {
    type Err = super::UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| super::UnknownVariant {
                kind: "procurement status",
                value: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcurementRequest {
    pub id: Uuid,
    pub title: String,
    pub justification: Option<String>,
    pub status: ProcurementStatus,
    pub license_id: Option<Uuid>,
    pub seats_requested: i32,
    pub requested_by: Uuid,
    pub approved_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Reference to the license a request concerns
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LicenseRef {
    pub id: Uuid,
    pub name: String,
    pub vendor: String,
}

/// Procurement row with its relations resolved
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProcurementView {
    pub id: Uuid,
    pub title: String,
    pub justification: Option<String>,
    pub status: ProcurementStatus,
    pub seats_requested: i32,
    pub license: Option<LicenseRef>,
    pub requested_by: Option<UserSummary>,
    pub approved_by: Option<UserSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_completed_is_archived() {
        assert!(ProcurementStatus::Completed.is_archived());
        assert!(!ProcurementStatus::Pending.is_archived());
        assert!(!ProcurementStatus::Approved.is_archived());
        assert!(!ProcurementStatus::Rejected.is_archived());
    }
}
