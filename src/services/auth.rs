//! Authentication service: registration, login, token issuance

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::{
        enums::{UserRole, UserStatus},
        user::{RegisterUser, User, UserClaims},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Register a new member account
    pub async fn register(&self, request: RegisterUser) -> AppResult<User> {
        if self.repository.users.email_exists(&request.email, None).await? {
            return Err(AppError::Duplicate(format!(
                "Email already exists: {}",
                request.email
            )));
        }

        let password_hash = self.hash_password(&request.password)?;
        self.repository
            .users
            .create(&request.email, &password_hash, &request.full_name, UserRole::Member)
            .await
    }

    /// Authenticate by email/password and issue a JWT
    pub async fn login(&self, email: &str, password: &str) -> AppResult<(String, User)> {
        let user = self
            .repository
            .users
            .get_by_email(email)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid email or password".to_string()))?;

        if user.status != UserStatus::Active {
            return Err(AppError::Authentication("Account is not active".to_string()));
        }

        if !self.verify_password(password, &user.password_hash)? {
            return Err(AppError::Authentication(
                "Invalid email or password".to_string(),
            ));
        }

        let token = self.create_token_for_user(&user)?;
        Ok((token, user))
    }

    /// Current user from validated claims
    pub async fn me(&self, user_id: i64) -> AppResult<User> {
        self.repository.users.get_by_id(user_id).await
    }

    /// Create a JWT for an account
    pub fn create_token_for_user(&self, user: &User) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let exp = now + (self.config.jwt_expiration_hours as i64 * 3600);

        let claims = UserClaims {
            sub: user.email.clone(),
            user_id: user.id,
            role: user.role,
            exp,
            iat: now,
        };

        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    /// Hash a password using Argon2
    pub fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }

    /// Verify a password against a stored argon2 hash
    pub fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Create the initial admin account when the users table is empty
    pub async fn bootstrap_admin(&self) -> AppResult<Option<User>> {
        if self.repository.users.count().await? > 0 {
            return Ok(None);
        }

        let password_hash = self.hash_password(&self.config.admin_password)?;
        let admin = self
            .repository
            .users
            .create(
                &self.config.admin_email,
                &password_hash,
                "Administrator",
                UserRole::Admin,
            )
            .await?;

        tracing::info!("Created initial admin account {}", admin.email);
        Ok(Some(admin))
    }
}
