//! Notification entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// The closed set of notification kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    LicenseAssigned,
    LicenseRevoked,
    LicenseExpiring,
    ProcurementSubmitted,
    ProcurementApproved,
    ProcurementRejected,
    System,
}

impl NotificationType {
    pub const ALL: [NotificationType; 7] = [
        NotificationType::LicenseAssigned,
        NotificationType::LicenseRevoked,
        NotificationType::LicenseExpiring,
        NotificationType::ProcurementSubmitted,
        NotificationType::ProcurementApproved,
        NotificationType::ProcurementRejected,
        NotificationType::System,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::LicenseAssigned => "LICENSE_ASSIGNED",
            NotificationType::LicenseRevoked => "LICENSE_REVOKED",
            NotificationType::LicenseExpiring => "LICENSE_EXPIRING",
            NotificationType::ProcurementSubmitted => "PROCUREMENT_SUBMITTED",
            NotificationType::ProcurementApproved => "PROCUREMENT_APPROVED",
            NotificationType::ProcurementRejected => "PROCUREMENT_REJECTED",
            NotificationType::System => "SYSTEM",
        }
    }
}

impl std::str::FromStr for NotificationType {
    type Err = super::UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| super::UnknownVariant {
                kind: "notification type",
                value: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub url: Option<String>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub user_id: Uuid,
    pub title: String,
    pub message: String,
    pub kind: NotificationType,
    pub url: Option<String>,
}

/// The caller's notifications with the unread badge count
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NotificationFeed {
    pub notifications: Vec<Notification>,
    pub unread_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seven_kinds() {
        assert_eq!(NotificationType::ALL.len(), 7);
        for kind in NotificationType::ALL {
            assert_eq!(kind.as_str().parse::<NotificationType>(), Ok(kind));
        }
    }

    #[test]
    fn test_type_field_name() {
        let n = Notification {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "Seat assigned".to_string(),
            message: "You now have an IDE seat".to_string(),
            kind: NotificationType::LicenseAssigned,
            url: None,
            read: false,
            created_at: Utc::now(),
        };
        let value = serde_json::to_value(&n).unwrap();
        assert_eq!(value["type"], "LICENSE_ASSIGNED");
    }
}
