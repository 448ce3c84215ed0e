//! License and license key entities, plus seat arithmetic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Lifecycle state of a single license key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KeyStatus {
    Available,
    Assigned,
    Revoked,
}

impl KeyStatus {
    pub const ALL: [KeyStatus; 3] = [KeyStatus::Available, KeyStatus::Assigned, KeyStatus::Revoked];

    pub fn as_str(&self) -> &'static str {
        match self {
            KeyStatus::Available => "AVAILABLE",
            KeyStatus::Assigned => "ASSIGNED",
            KeyStatus::Revoked => "REVOKED",
        }
    }

    /// Whether this status consumes a seat
    pub fn occupies_seat(&self) -> bool {
        matches!(self, KeyStatus::Assigned)
    }
}

impl std::str::FromStr for KeyStatus {
    type Err = super::UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| super::UnknownVariant {
                kind: "key status",
                value: s.to_string(),
            })
    }
}

impl std::fmt::Display for KeyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Seats still free: `max(0, total - assigned)`.
pub fn available_seats(total_seats: i32, assigned: u64) -> u64 {
    let total = u64::try_from(total_seats).unwrap_or(0);
    total.saturating_sub(assigned)
}

/// License domain entity
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct License {
    pub id: Uuid,
    pub name: String,
    pub vendor: String,
    pub owner: String,
    pub total_seats: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A key belonging to a license
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LicenseKey {
    pub id: Uuid,
    pub license_id: Uuid,
    pub key: String,
    pub status: KeyStatus,
    pub assigned_to: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for a key to be inserted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLicenseKey {
    pub license_id: Uuid,
    pub key: String,
    pub status: KeyStatus,
    pub assigned_to: Option<Uuid>,
}

/// License together with its keys and derived seat counts
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LicenseDetail {
    #[serde(flatten)]
    pub license: License,
    pub keys: Vec<LicenseKey>,
    pub assigned_seats: u64,
    pub available_seats: u64,
}

impl LicenseDetail {
    pub fn new(license: License, keys: Vec<LicenseKey>) -> Self {
        let assigned = keys.iter().filter(|k| k.status.occupies_seat()).count() as u64;
        Self {
            available_seats: available_seats(license.total_seats, assigned),
            assigned_seats: assigned,
            license,
            keys,
        }
    }
}

/// License row with seat counts, used by the list page and dropdowns
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LicenseSeats {
    pub id: Uuid,
    pub name: String,
    pub vendor: String,
    pub owner: String,
    pub total_seats: i32,
    pub assigned_seats: u64,
    pub available_seats: u64,
}

impl LicenseSeats {
    pub fn new(license: License, assigned: u64) -> Self {
        Self {
            available_seats: available_seats(license.total_seats, assigned),
            assigned_seats: assigned,
            id: license.id,
            name: license.name,
            vendor: license.vendor,
            owner: license.owner,
            total_seats: license.total_seats,
        }
    }
}
