//! User database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::{Department, Role, User};
use crate::errors::AppError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub department: String,
    pub role: String,
    pub manager_id: Option<Uuid>,
    pub added_by: Option<Uuid>,
    pub password_hash: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::ManagerId",
        to = "Column::Id",
        on_delete = "SetNull"
    )]
    Manager,
    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::AddedBy",
        to = "Column::Id",
        on_delete = "SetNull"
    )]
    AddedBy,
}

impl ActiveModelBehavior for ActiveModel {}

/// Convert database model to domain entity
impl TryFrom<Model> for User {
    type Error = AppError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let department: Department = model
            .department
            .parse()
            .map_err(|e| AppError::internal(format!("user {}: {}", model.id, e)))?;
        let role: Role = model
            .role
            .parse()
            .map_err(|e| AppError::internal(format!("user {}: {}", model.id, e)))?;

        Ok(User {
            id: model.id,
            name: model.name,
            email: model.email,
            department,
            role,
            manager_id: model.manager_id,
            added_by: model.added_by,
            password_hash: model.password_hash,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
