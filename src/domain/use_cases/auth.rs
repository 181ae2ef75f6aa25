use validator::Validate;

use crate::auth::password::verify_password;
use crate::entities::user::{LoginRequest, LoginResponse, UserSummary};
use crate::errors::AuthError;
use crate::interfaces::repositories::user::UserRepository;
use crate::repositories::token::TokenService;

pub struct AuthHandler<R, T>
where
    R: UserRepository,
    T: TokenService,
{
    pub user_repo: R,
    pub token_service: T,
}

impl<R, T> AuthHandler<R, T>
where
    R: UserRepository,
    T: TokenService,
{
    pub fn new(user_repo: R, token_service: T) -> Self {
        AuthHandler {
            user_repo,
            token_service
        }
    }

    /// Admin session login. Three distinct outcomes so clients can tell
    /// them apart: bad credentials (401), valid credentials without staff
    /// privilege (403), staff login (200 with a bearer token).
    pub async fn admin_login(&self, request: LoginRequest) -> Result<LoginResponse, AuthError> {
        request.validate()?;

        let user = self.user_repo.get_user_by_username(&request.username)
            .await
            .map_err(|_e| AuthError::WrongCredentials)?
            .ok_or(AuthError::WrongCredentials)?;

        let is_password_valid = verify_password(&request.password, &user.password_hash)
            .map_err(|_| AuthError::WrongCredentials)?;
        if !is_password_valid {
            return Err(AuthError::WrongCredentials);
        }

        if !user.is_staff {
            return Err(AuthError::Forbidden(
                "Access denied: user is not an administrator".to_string(),
            ));
        }

        let token = self.token_service.create_jwt(&user).map_err(|e| {
            tracing::warn!("Failed to create JWT: {}", e);
            AuthError::TokenCreation
        })?;

        tracing::info!(username = %user.username, "Admin logged in successfully");

        Ok(LoginResponse {
            success: true,
            message: "Authentication successful".to_string(),
            user: UserSummary::from(&user),
            token,
            token_type: "Bearer".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::JwtService;
    use crate::auth::password::hash_password;
    use crate::entities::user::User;
    use crate::interfaces::repositories::user::MockUserRepository;
    use crate::settings::{AppConfig, AppEnvironment};
    use chrono::Utc;
    use mockall::predicate::*;
    use uuid::Uuid;

    fn test_jwt() -> JwtService {
        JwtService::new(&AppConfig {
            env: AppEnvironment::Testing,
            name: "test".into(),
            port: 0,
            host: "127.0.0.1".into(),
            worker_count: 1,
            database_url: "postgres://localhost/test".into(),
            cors_allowed_origins: vec![],
            jwt_secret: "test_jwt_secret_that_is_long_enough_for_hs512_1234567890".into(),
            jwt_expiration_minutes: 5,
            media_root: "media".into(),
            media_base_url: "/media".into(),
        })
    }

    fn user_with_password(password: &str, is_staff: bool) -> User {
        User {
            id: Uuid::new_v4(),
            username: "chris".into(),
            password_hash: hash_password(password).unwrap(),
            is_staff,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn staff_login_returns_token_and_summary() {
        let mut repo = MockUserRepository::new();
        let user = user_with_password("AdminPass123!", true);

        repo.expect_get_user_by_username()
            .with(eq("chris"))
            .returning(move |_| Ok(Some(user.clone())));

        let handler = AuthHandler::new(repo, test_jwt());
        let response = handler.admin_login(LoginRequest {
            username: "chris".into(),
            password: "AdminPass123!".into(),
        }).await.unwrap();

        assert!(response.success);
        assert!(response.user.is_staff);
        assert_eq!(response.user.username, "chris");
        assert!(!response.token.is_empty());
        assert_eq!(response.token_type, "Bearer");
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let mut repo = MockUserRepository::new();
        let user = user_with_password("CorrectPass1!", true);

        repo.expect_get_user_by_username()
            .returning(move |_| Ok(Some(user.clone())));

        let handler = AuthHandler::new(repo, test_jwt());
        let result = handler.admin_login(LoginRequest {
            username: "chris".into(),
            password: "WrongPass1!".into(),
        }).await;

        assert!(matches!(result, Err(AuthError::WrongCredentials)));
    }

    #[tokio::test]
    async fn unknown_user_is_unauthorized() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_user_by_username().returning(|_| Ok(None));

        let handler = AuthHandler::new(repo, test_jwt());
        let result = handler.admin_login(LoginRequest {
            username: "ghost".into(),
            password: "whatever".into(),
        }).await;

        assert!(matches!(result, Err(AuthError::WrongCredentials)));
    }

    #[tokio::test]
    async fn valid_non_staff_credentials_are_forbidden_not_unauthorized() {
        let mut repo = MockUserRepository::new();
        let user = user_with_password("VisitorPass1!", false);

        repo.expect_get_user_by_username()
            .returning(move |_| Ok(Some(user.clone())));

        let handler = AuthHandler::new(repo, test_jwt());
        let result = handler.admin_login(LoginRequest {
            username: "chris".into(),
            password: "VisitorPass1!".into(),
        }).await;

        assert!(matches!(result, Err(AuthError::Forbidden(_))));
    }
}
