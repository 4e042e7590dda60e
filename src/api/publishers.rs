//! Publisher catalog endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::AppResult,
    models::publisher::{CreatePublisher, Publisher, UpdatePublisher},
};

use super::{
    books::{PageQuery, PaginatedResponse},
    AuthenticatedUser,
};

/// List publishers with pagination
#[utoipa::path(
    get,
    path = "/publishers",
    tag = "publishers",
    params(PageQuery),
    responses(
        (status = 200, description = "Page of publishers", body = PaginatedResponse<Publisher>)
    )
)]
pub async fn list_publishers(
    State(state): State<crate::AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<PaginatedResponse<Publisher>>> {
    let (publishers, total) = state
        .services
        .publishers
        .list(query.page(), query.per_page())
        .await?;

    Ok(Json(PaginatedResponse {
        items: publishers,
        total,
        page: query.page(),
        per_page: query.per_page(),
    }))
}

/// Get publisher by ID
#[utoipa::path(
    get,
    path = "/publishers/{id}",
    tag = "publishers",
    params(
        ("id" = i64, Path, description = "Publisher ID")
    ),
    responses(
        (status = 200, description = "Publisher", body = Publisher),
        (status = 404, description = "Publisher not found")
    )
)]
pub async fn get_publisher(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Publisher>> {
    let publisher = state.services.publishers.get_by_id(id).await?;
    Ok(Json(publisher))
}

/// Create a new publisher (admin)
#[utoipa::path(
    post,
    path = "/publishers",
    tag = "publishers",
    security(("bearer_auth" = [])),
    request_body = CreatePublisher,
    responses(
        (status = 201, description = "Publisher created", body = Publisher),
        (status = 409, description = "Name already exists")
    )
)]
pub async fn create_publisher(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreatePublisher>,
) -> AppResult<(StatusCode, Json<Publisher>)> {
    claims.require_admin()?;
    request.validate()?;

    let publisher = state.services.publishers.create(request).await?;
    Ok((StatusCode::CREATED, Json(publisher)))
}

/// Update an existing publisher (admin)
#[utoipa::path(
    put,
    path = "/publishers/{id}",
    tag = "publishers",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Publisher ID")
    ),
    request_body = UpdatePublisher,
    responses(
        (status = 200, description = "Publisher updated", body = Publisher),
        (status = 404, description = "Publisher not found"),
        (status = 409, description = "Name already exists")
    )
)]
pub async fn update_publisher(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i64>,
    Json(request): Json<UpdatePublisher>,
) -> AppResult<Json<Publisher>> {
    claims.require_admin()?;
    request.validate()?;

    let publisher = state.services.publishers.update(id, request).await?;
    Ok(Json(publisher))
}

/// Delete a publisher (admin). Blocked while books reference it.
#[utoipa::path(
    delete,
    path = "/publishers/{id}",
    tag = "publishers",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Publisher ID")
    ),
    responses(
        (status = 204, description = "Publisher deleted"),
        (status = 404, description = "Publisher not found"),
        (status = 409, description = "Publisher has associated books")
    )
)]
pub async fn delete_publisher(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    claims.require_admin()?;

    state.services.publishers.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
