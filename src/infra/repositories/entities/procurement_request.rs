//! Procurement request database entity.

use sea_orm::entity::prelude::*;

use crate::domain::ProcurementRequest;
use crate::errors::AppError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "procurement_requests")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub justification: Option<String>,
    pub status: String,
    pub license_id: Option<Uuid>,
    pub seats_requested: i32,
    pub requested_by: Uuid,
    pub approved_by: Option<Uuid>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::license::Entity",
        from = "Column::LicenseId",
        to = "super::license::Column::Id",
        on_delete = "SetNull"
    )]
    License,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::RequestedBy",
        to = "super::user::Column::Id"
    )]
    RequestedBy,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ApprovedBy",
        to = "super::user::Column::Id",
        on_delete = "SetNull"
    )]
    ApprovedBy,
}

impl Related<super::license::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::License.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for ProcurementRequest {
    type Error = AppError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let status = model
            .status
            .parse()
            .map_err(|e| AppError::internal(format!("procurement {}: {}", model.id, e)))?;

        Ok(ProcurementRequest {
            id: model.id,
            title: model.title,
            justification: model.justification,
            status,
            license_id: model.license_id,
            seats_requested: model.seats_requested,
            requested_by: model.requested_by,
            approved_by: model.approved_by,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
