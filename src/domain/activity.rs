//! License activity log entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityAction {
    KeyAdded,
    KeyRemoved,
    KeyStatusChanged,
}

/// One line of the activity log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ActivityEntry {
    pub id: Uuid,
    pub license_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub action: ActivityAction,
    pub actor_id: Uuid,
    pub actor_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ActivityEntry {
    pub fn new(license_id: Uuid, action: ActivityAction, actor_id: Uuid, actor_email: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            license_id,
            timestamp: Utc::now(),
            action,
            actor_id,
            actor_email: actor_email.to_string(),
            key_id: None,
            details: None,
        }
    }

    pub fn key(mut self, key_id: Uuid) -> Self {
        self.key_id = Some(key_id);
        self
    }

    pub fn details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}
