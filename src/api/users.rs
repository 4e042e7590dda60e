//! User management endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::user::{ChangePassword, UpdateUser, UpdateUserRole, UpdateUserStatus, User, UserQuery},
};

use super::{books::PaginatedResponse, AuthenticatedUser};

/// List users with status/role filters and pagination (admin)
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    security(("bearer_auth" = [])),
    params(UserQuery),
    responses(
        (status = 200, description = "Page of users", body = PaginatedResponse<User>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not an admin")
    )
)]
pub async fn list_users(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<UserQuery>,
) -> AppResult<Json<PaginatedResponse<User>>> {
    claims.require_admin()?;

    let (users, total) = state.services.users.list(&query).await?;

    Ok(Json(PaginatedResponse {
        items: users,
        total,
        page: query.page.unwrap_or(1),
        per_page: query.per_page.unwrap_or(20),
    }))
}

/// Get user by ID (self or admin)
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User", body = User),
        (status = 403, description = "Not the account owner or an admin"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<Json<User>> {
    if claims.user_id != id && !claims.is_admin() {
        return Err(AppError::Forbidden(
            "Cannot view another user's account".to_string(),
        ));
    }

    let user = state.services.users.get_by_id(id).await?;
    Ok(Json(user))
}

/// Update profile fields (self or admin)
#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    request_body = UpdateUser,
    responses(
        (status = 200, description = "User updated", body = User),
        (status = 403, description = "Not the account owner or an admin"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Email already exists")
    )
)]
pub async fn update_user(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i64>,
    Json(request): Json<UpdateUser>,
) -> AppResult<Json<User>> {
    if claims.user_id != id && !claims.is_admin() {
        return Err(AppError::Forbidden(
            "Cannot update another user's account".to_string(),
        ));
    }
    request.validate()?;

    let user = state.services.users.update(id, request).await?;
    Ok(Json(user))
}

/// Change own password
#[utoipa::path(
    put,
    path = "/users/{id}/password",
    tag = "users",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    request_body = ChangePassword,
    responses(
        (status = 204, description = "Password changed"),
        (status = 403, description = "Not the account owner"),
        (status = 409, description = "Old password is incorrect")
    )
)]
pub async fn change_password(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i64>,
    Json(request): Json<ChangePassword>,
) -> AppResult<axum::http::StatusCode> {
    if claims.user_id != id {
        return Err(AppError::Forbidden(
            "Cannot change another user's password".to_string(),
        ));
    }
    request.validate()?;

    state.services.users.change_password(id, request).await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}

/// Set account status (admin)
#[utoipa::path(
    put,
    path = "/users/{id}/status",
    tag = "users",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    request_body = UpdateUserStatus,
    responses(
        (status = 200, description = "Status updated", body = User),
        (status = 403, description = "Not an admin"),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_user_status(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i64>,
    Json(request): Json<UpdateUserStatus>,
) -> AppResult<Json<User>> {
    claims.require_admin()?;

    let user = state.services.users.update_status(id, request.status).await?;
    Ok(Json(user))
}

/// Set account role (admin)
#[utoipa::path(
    put,
    path = "/users/{id}/role",
    tag = "users",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    request_body = UpdateUserRole,
    responses(
        (status = 200, description = "Role updated", body = User),
        (status = 403, description = "Not an admin"),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_user_role(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i64>,
    Json(request): Json<UpdateUserRole>,
) -> AppResult<Json<User>> {
    claims.require_admin()?;

    let user = state.services.users.update_role(id, request.role).await?;
    Ok(Json(user))
}
