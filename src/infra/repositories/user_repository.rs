//! User repository: directory lookups, paginated listing and creation.

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, SqlErr,
};
use uuid::Uuid;

use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use super::search;
use crate::domain::{Department, NewUser, Role, User, UserSummary};
use crate::errors::{AppError, AppResult};
use crate::types::PaginationParams;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Resolve id/name/email for a set of users; unknown ids are skipped.
    async fn find_summaries(&self, ids: Vec<Uuid>) -> AppResult<Vec<UserSummary>>;

    /// Insert a user. A duplicate email yields `Conflict`.
    async fn create(&self, user: NewUser) -> AppResult<User>;

    /// One page of users ordered by name, plus the total match count.
    async fn list(&self, params: PaginationParams) -> AppResult<(Vec<User>, u64)>;

    /// Directory search, optionally restricted to a department.
    async fn search_directory(
        &self,
        department: Option<Department>,
        search: Option<String>,
        limit: u64,
    ) -> AppResult<Vec<User>>;

    /// Users holding the MANAGER role, optionally restricted to a department.
    async fn list_managers(&self, department: Option<Department>) -> AppResult<Vec<User>>;
}

/// Concrete implementation of UserRepository
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Case-insensitive substring match on name OR email.
pub(crate) fn name_or_email_matches(term: &str) -> Condition {
    Condition::any()
        .add(Expr::expr(Func::lower(Expr::col(user::Column::Name))).like(search::contains(term)))
        .add(Expr::expr(Func::lower(Expr::col(user::Column::Email))).like(search::contains(term)))
}

fn into_users(models: Vec<user::Model>) -> AppResult<Vec<User>> {
    models.into_iter().map(User::try_from).collect()
}

fn map_insert_error(e: DbErr) -> AppError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::conflict("A user with this email already exists")
        }
        Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
            AppError::validation("Referenced manager does not exist")
        }
        _ => AppError::from(e),
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        UserEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn find_summaries(&self, ids: Vec<Uuid>) -> AppResult<Vec<UserSummary>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = UserEntity::find()
            .filter(user::Column::Id.is_in(ids))
            .all(&self.db)
            .await?;

        Ok(models
            .into_iter()
            .map(|m| UserSummary {
                id: m.id,
                name: m.name,
                email: m.email,
            })
            .collect())
    }

    async fn create(&self, new_user: NewUser) -> AppResult<User> {
        let now = chrono::Utc::now();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(new_user.name),
            email: Set(new_user.email),
            department: Set(new_user.department.as_str().to_string()),
            role: Set(new_user.role.as_str().to_string()),
            manager_id: Set(new_user.manager_id),
            added_by: Set(new_user.added_by),
            password_hash: Set(Some(new_user.password_hash)),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(&self.db).await.map_err(map_insert_error)?;
        User::try_from(model)
    }

    async fn list(&self, params: PaginationParams) -> AppResult<(Vec<User>, u64)> {
        let mut query = UserEntity::find();
        if let Some(term) = params.search_term() {
            query = query.filter(name_or_email_matches(term));
        }

        let total = query.clone().count(&self.db).await?;
        let models = query
            .order_by_asc(user::Column::Name)
            .offset(params.offset())
            .limit(params.limit())
            .all(&self.db)
            .await?;

        Ok((into_users(models)?, total))
    }

    async fn search_directory(
        &self,
        department: Option<Department>,
        search: Option<String>,
        limit: u64,
    ) -> AppResult<Vec<User>> {
        let mut query = UserEntity::find();
        if let Some(department) = department {
            query = query.filter(user::Column::Department.eq(department.as_str()));
        }
        if let Some(term) = search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            query = query.filter(name_or_email_matches(term));
        }

        let models = query
            .order_by_asc(user::Column::Name)
            .limit(limit)
            .all(&self.db)
            .await?;

        into_users(models)
    }

    async fn list_managers(&self, department: Option<Department>) -> AppResult<Vec<User>> {
        let mut query = UserEntity::find().filter(user::Column::Role.eq(Role::Manager.as_str()));
        if let Some(department) = department {
            query = query.filter(user::Column::Department.eq(department.as_str()));
        }

        let models = query.order_by_asc(user::Column::Name).all(&self.db).await?;
        into_users(models)
    }
}
