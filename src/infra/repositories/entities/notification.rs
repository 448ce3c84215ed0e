//! Notification database entity.

use sea_orm::entity::prelude::*;

use crate::domain::Notification;
use crate::errors::AppError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "notifications")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub message: String,
    pub kind: String,
    pub url: Option<String>,
    pub read: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Notification {
    type Error = AppError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let kind = model
            .kind
            .parse()
            .map_err(|e| AppError::internal(format!("notification {}: {}", model.id, e)))?;

        Ok(Notification {
            id: model.id,
            user_id: model.user_id,
            title: model.title,
            message: model.message,
            kind,
            url: model.url,
            read: model.read,
            created_at: model.created_at,
        })
    }
}
