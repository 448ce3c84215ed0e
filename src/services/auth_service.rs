//! Authentication service - identity provider for sessions.
//!
//! Issues bearer tokens whose claims carry `user_metadata { role, department }`,
//! resolves tokens back into a [`Session`] and re-verifies passwords for
//! license access step-up.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{Config, SECONDS_PER_HOUR, TOKEN_TYPE_BEARER};
use crate::domain::{Password, Session, User};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;

/// Role and department as carried by the token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMetadata {
    pub role: String,
    pub department: String,
}

/// JWT claims payload
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub user_metadata: UserMetadata,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn into_session(self) -> Session {
        Session::from_metadata(
            self.sub,
            self.email,
            &self.user_metadata.role,
            &self.user_metadata.department,
        )
    }
}

/// Token response returned after successful authentication
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    /// JWT access token
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub access_token: String,
    /// Token type (always "Bearer")
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Token expiration time in seconds
    #[schema(example = 28800)]
    pub expires_in: i64,
}

/// Authentication service trait for dependency injection.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Exchange email and password for a bearer token
    async fn login(&self, email: String, password: String) -> AppResult<TokenResponse>;

    /// Resolve a bearer token into a session
    fn verify_token(&self, token: &str) -> AppResult<Session>;

    /// Check a re-entered password for the session's account
    async fn verify_password(&self, session: &Session, password: String) -> AppResult<bool>;
}

fn generate_token(user: &User, config: &Config) -> AppResult<TokenResponse> {
    let now = Utc::now();
    let expires_at = now + Duration::hours(config.jwt_expiration_hours);

    let claims = Claims {
        sub: user.id,
        email: user.email.clone(),
        user_metadata: UserMetadata {
            role: user.role.to_string(),
            department: user.department.to_string(),
        },
        exp: expires_at.timestamp(),
        iat: now.timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret_bytes()),
    )?;

    Ok(TokenResponse {
        access_token: token,
        token_type: TOKEN_TYPE_BEARER.to_string(),
        expires_in: config.jwt_expiration_hours * SECONDS_PER_HOUR,
    })
}

fn decode_claims(token: &str, config: &Config) -> AppResult<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret_bytes()),
        &Validation::default(),
    )?;

    Ok(token_data.claims)
}

/// Concrete implementation of AuthService using Unit of Work.
pub struct Authenticator<U: UnitOfWork> {
    uow: Arc<U>,
    config: Config,
}

impl<U: UnitOfWork> Authenticator<U> {
    pub fn new(uow: Arc<U>, config: Config) -> Self {
        Self { uow, config }
    }
}

#[async_trait]
impl<U: UnitOfWork> AuthService for Authenticator<U> {
    async fn login(&self, email: String, password: String) -> AppResult<TokenResponse> {
        let user = self.uow.users().find_by_email(&email).await?;

        // Unknown accounts still pay for a full verification
        let stored = user.as_ref().and_then(|u| u.password_hash.as_deref());
        let password_valid = Password::verify_stored(stored, &password);

        match user {
            Some(user) if password_valid => {
                tracing::info!(user_id = %user.id, "login succeeded");
                generate_token(&user, &self.config)
            }
            _ => {
                tracing::info!("login rejected");
                Err(AppError::InvalidCredentials)
            }
        }
    }

    fn verify_token(&self, token: &str) -> AppResult<Session> {
        decode_claims(token, &self.config)
            .map(Claims::into_session)
            .map_err(|e| {
                tracing::debug!("bearer token rejected: {}", e);
                AppError::Unauthorized
            })
    }

    async fn verify_password(&self, session: &Session, password: String) -> AppResult<bool> {
        let user = self.uow.users().find_by_email(&session.email).await?;
        let stored = user
            .as_ref()
            .filter(|u| u.id == session.user_id)
            .and_then(|u| u.password_hash.as_deref());

        let verified = Password::verify_stored(stored, &password);
        tracing::info!(user_id = %session.user_id, verified, "license access verification");
        Ok(verified)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Department, Role};
    use crate::infra::MockUserRepository;
    use crate::services::test_support::TestUnitOfWork;

    const SECRET: &str = "test-secret-key-for-testing-only-32chars";

    fn user_with_password(password: &str) -> User {
        User {
            id: Uuid::new_v4(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            department: Department::Itsg,
            role: Role::Manager,
            manager_id: None,
            added_by: None,
            password_hash: Some(Password::new(password).unwrap().into_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn authenticator(users: MockUserRepository) -> Authenticator<TestUnitOfWork> {
        let uow = TestUnitOfWork::new().with_users(users);
        Authenticator::new(Arc::new(uow), Config::with_secret(SECRET).unwrap())
    }

    #[tokio::test]
    async fn test_login_issues_token_with_metadata() {
        let user = user_with_password("correct-password");
        let expected_id = user.id;
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_email()
            .returning(move |_| Ok(Some(user.clone())));

        let auth = authenticator(users);
        let token = auth
            .login("ada@example.com".into(), "correct-password".into())
            .await
            .unwrap();
        assert_eq!(token.token_type, "Bearer");

        let session = auth.verify_token(&token.access_token).unwrap();
        assert_eq!(session.user_id, expected_id);
        assert_eq!(session.role, Some(Role::Manager));
        assert_eq!(session.department, Some(Department::Itsg));
    }

    #[tokio::test]
    async fn test_login_wrong_password_or_unknown_email() {
        let user = user_with_password("correct-password");
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_email()
            .returning(move |email| Ok((email == "ada@example.com").then(|| user.clone())));

        let auth = authenticator(users);
        let wrong = auth.login("ada@example.com".into(), "wrong-password".into()).await;
        assert!(matches!(wrong, Err(AppError::InvalidCredentials)));

        let unknown = auth.login("who@example.com".into(), "correct-password".into()).await;
        assert!(matches!(unknown, Err(AppError::InvalidCredentials)));
    }

    #[test]
    fn test_garbage_token_is_unauthorized() {
        let auth = authenticator(MockUserRepository::new());
        assert!(matches!(auth.verify_token("not-a-jwt"), Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_verify_password() {
        let user = user_with_password("correct-password");
        let session = Session {
            user_id: user.id,
            email: user.email.clone(),
            role: Some(user.role),
            department: Some(user.department),
        };
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_email()
            .returning(move |_| Ok(Some(user.clone())));

        let auth = authenticator(users);
        assert!(auth.verify_password(&session, "correct-password".into()).await.unwrap());
        assert!(!auth.verify_password(&session, "wrong-password".into()).await.unwrap());
    }
}
