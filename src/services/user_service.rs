//! User service - user management and directory use cases.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::{DROPDOWN_LIMIT, MAX_USER_NAME_LENGTH, VIEW_TAG_USERS};
use crate::domain::{Department, DirectoryEntry, NewUser, Password, Role, Session, UserResponse};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::{Cache, UnitOfWork};
use crate::policy::{self, Operation};
use crate::types::{Paginated, PaginationParams};

/// Fields accepted when creating a user
#[derive(Debug, Clone)]
pub struct CreateUserInput {
    pub name: String,
    pub email: String,
    pub department: Department,
    pub role: Role,
    pub password: String,
    pub manager_id: Option<Uuid>,
}

/// User service trait for dependency injection.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Create a user on behalf of `session` (ITSG only)
    async fn create_user(&self, session: &Session, input: CreateUserInput) -> AppResult<UserResponse>;

    /// One user with manager and added-by summaries
    async fn get_user(&self, session: &Session, id: Uuid) -> AppResult<UserResponse>;

    /// Paginated user listing with optional search
    async fn list_users(
        &self,
        session: &Session,
        params: PaginationParams,
    ) -> AppResult<Paginated<UserResponse>>;

    /// Directory dropdown, scoped to the caller's department unless ITSG
    async fn search_directory(
        &self,
        session: &Session,
        search: Option<String>,
    ) -> AppResult<Vec<DirectoryEntry>>;

    /// Managers, scoped like the directory
    async fn list_managers(&self, session: &Session) -> AppResult<Vec<DirectoryEntry>>;
}

/// Concrete implementation of UserService using Unit of Work.
pub struct UserManager<U: UnitOfWork> {
    uow: Arc<U>,
    cache: Option<Arc<Cache>>,
}

impl<U: UnitOfWork> UserManager<U> {
    pub fn new(uow: Arc<U>, cache: Option<Arc<Cache>>) -> Self {
        Self { uow, cache }
    }

    async fn with_summaries(&self, user: crate::domain::User) -> AppResult<UserResponse> {
        let ids: Vec<Uuid> = user.manager_id.into_iter().chain(user.added_by).collect();
        let people = self.uow.users().find_summaries(ids).await?;
        let find = |id: Option<Uuid>| id.and_then(|id| people.iter().find(|p| p.id == id).cloned());

        let manager = find(user.manager_id);
        let added_by = find(user.added_by);
        Ok(UserResponse::new(user, manager, added_by))
    }
}

fn list_cache_key(params: &PaginationParams) -> String {
    format!(
        "list:{}:{}:{}",
        params.page.max(1),
        params.limit(),
        params.search_term().unwrap_or_default().to_lowercase()
    )
}

#[async_trait]
impl<U: UnitOfWork> UserService for UserManager<U> {
    async fn create_user(&self, session: &Session, input: CreateUserInput) -> AppResult<UserResponse> {
        policy::authorize(session, Operation::CreateUser)?;

        let name = input.name.trim();
        if name.is_empty() || name.chars().count() > MAX_USER_NAME_LENGTH {
            return Err(AppError::validation(format!(
                "Name must be 1 to {} characters",
                MAX_USER_NAME_LENGTH
            )));
        }

        let users = self.uow.users();
        if users.find_by_email(&input.email).await?.is_some() {
            return Err(AppError::conflict("A user with this email already exists"));
        }
        if let Some(manager_id) = input.manager_id {
            if users.find_by_id(manager_id).await?.is_none() {
                return Err(AppError::validation("manager_id does not reference an existing user"));
            }
        }

        let password_hash = Password::new(&input.password)?.into_string();
        let user = users
            .create(NewUser {
                name: name.to_string(),
                email: input.email,
                department: input.department,
                role: input.role,
                manager_id: input.manager_id,
                added_by: Some(session.user_id),
                password_hash,
            })
            .await?;

        tracing::info!(user_id = %user.id, added_by = %session.user_id, "user created");
        if let Some(cache) = &self.cache {
            cache.invalidate_tag(VIEW_TAG_USERS).await;
        }

        self.with_summaries(user).await
    }

    async fn get_user(&self, session: &Session, id: Uuid) -> AppResult<UserResponse> {
        policy::authorize_view_user(session, id)?;

        let user = self.uow.users().find_by_id(id).await?.ok_or_not_found()?;
        self.with_summaries(user).await
    }

    async fn list_users(
        &self,
        session: &Session,
        params: PaginationParams,
    ) -> AppResult<Paginated<UserResponse>> {
        policy::authorize(session, Operation::ListUsers)?;

        let key = list_cache_key(&params);
        if let Some(cache) = &self.cache {
            if let Some(page) = cache.get_view(VIEW_TAG_USERS, &key).await {
                return Ok(page);
            }
        }

        let (users, total) = self.uow.users().list(params.clone()).await?;
        let page = Paginated::new(users, &params, total).map(UserResponse::from);

        if let Some(cache) = &self.cache {
            cache.set_view(VIEW_TAG_USERS, &key, &page).await;
        }
        Ok(page)
    }

    async fn search_directory(
        &self,
        session: &Session,
        search: Option<String>,
    ) -> AppResult<Vec<DirectoryEntry>> {
        let scope = policy::directory_scope(session)?;

        let users = self
            .uow
            .users()
            .search_directory(scope.department(), search, DROPDOWN_LIMIT)
            .await?;

        // Re-check the scope on the rows themselves
        Ok(users
            .into_iter()
            .filter(|u| scope.department().map_or(true, |d| u.department == d))
            .map(DirectoryEntry::from)
            .collect())
    }

    async fn list_managers(&self, session: &Session) -> AppResult<Vec<DirectoryEntry>> {
        policy::authorize(session, Operation::ListManagers)?;
        let scope = policy::directory_scope(session)?;

        let managers = self.uow.users().list_managers(scope.department()).await?;
        Ok(managers.into_iter().map(DirectoryEntry::from).collect())
    }
}
