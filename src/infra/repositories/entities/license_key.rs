//! License key database entity.

use sea_orm::entity::prelude::*;

use crate::domain::LicenseKey;
use crate::errors::AppError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "license_keys")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub license_id: Uuid,
    pub key: String,
    pub status: String,
    pub assigned_to: Option<Uuid>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::license::Entity",
        from = "Column::LicenseId",
        to = "super::license::Column::Id",
        on_delete = "Cascade"
    )]
    License,
}

impl Related<super::license::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::License.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for LicenseKey {
    type Error = AppError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let status = model
            .status
            .parse()
            .map_err(|e| AppError::internal(format!("license key {}: {}", model.id, e)))?;

        Ok(LicenseKey {
            id: model.id,
            license_id: model.license_id,
            key: model.key,
            status,
            assigned_to: model.assigned_to,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
