//! User account management service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::{UserRole, UserStatus},
        user::{ChangePassword, UpdateUser, User, UserQuery},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
}

impl UsersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    /// List users with optional status/role filters
    pub async fn list(&self, query: &UserQuery) -> AppResult<(Vec<User>, i64)> {
        self.repository.users.list(query).await
    }

    /// Update profile fields. Absent fields are left unchanged.
    pub async fn update(&self, id: i64, update: UpdateUser) -> AppResult<User> {
        self.repository.users.get_by_id(id).await?;

        if let Some(ref email) = update.email {
            if self.repository.users.email_exists(email, Some(id)).await? {
                return Err(AppError::Duplicate(format!("Email already exists: {}", email)));
            }
        }

        self.repository
            .users
            .update(id, update.email.as_deref(), update.full_name.as_deref())
            .await
    }

    /// Change password after verifying the old one
    pub async fn change_password(&self, id: i64, request: ChangePassword) -> AppResult<()> {
        let user = self.repository.users.get_by_id(id).await?;

        let parsed_hash = PasswordHash::new(&user.password_hash)
            .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
        if Argon2::default()
            .verify_password(request.old_password.as_bytes(), &parsed_hash)
            .is_err()
        {
            return Err(AppError::BusinessRule("Old password is incorrect".to_string()));
        }

        let salt = SaltString::generate(&mut OsRng);
        let new_hash = Argon2::default()
            .hash_password(request.new_password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;

        self.repository
            .users
            .update_password(id, &new_hash.to_string())
            .await
    }

    /// Set account status (admin operation)
    pub async fn update_status(&self, id: i64, status: UserStatus) -> AppResult<User> {
        self.repository.users.update_status(id, status).await
    }

    /// Set account role (admin operation)
    pub async fn update_role(&self, id: i64, role: UserRole) -> AppResult<User> {
        self.repository.users.update_role(id, role).await
    }
}
