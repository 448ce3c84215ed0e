//! License database entity.

use sea_orm::entity::prelude::*;

use crate::domain::License;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "licenses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub vendor: String,
    pub owner: String,
    pub total_seats: i32,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::license_key::Entity")]
    LicenseKeys,
}

impl Related<super::license_key::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LicenseKeys.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for License {
    fn from(model: Model) -> Self {
        License {
            id: model.id,
            name: model.name,
            vendor: model.vendor,
            owner: model.owner,
            total_seats: model.total_seats,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
