use std::sync::Arc;

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    extract::{Path, Query},
    http::StatusCode,
    response::Json,
    Extension,
};
use modkit::api::json::rejection_detail;
use modkit::api::problem::ProblemResponse;
use modkit::RequestCtx;
use tracing::{error, info};
use uuid::Uuid;

use crate::api::rest::dto::{CreateUserReq, ListUsersQuery, UpdateUserReq, UserDto, UserListDto};
use crate::api::rest::error::{from_parts, invalid_body, invalid_query, map_domain_error};
use crate::domain::service::Service;

/// List users in store order, windowed by `skip` / `limit`
pub async fn list_users(
    Extension(svc): Extension<Arc<Service>>,
    ctx: RequestCtx,
    query: Result<Query<ListUsersQuery>, QueryRejection>,
) -> Result<Json<UserListDto>, ProblemResponse> {
    let Query(query) = query.map_err(|e| invalid_query(e.body_text(), &ctx))?;
    info!("Listing users with query: {:?}", query);

    match svc.list_users(query.skip, query.limit).await {
        Ok(users) => Ok(Json(UserListDto(
            users.into_iter().map(UserDto::from).collect(),
        ))),
        Err(e) => {
            error!("Failed to list users: {}", e);
            Err(map_domain_error(&e, &ctx))
        }
    }
}

/// Get a specific user by ID
pub async fn get_user(
    Extension(svc): Extension<Arc<Service>>,
    Path(raw_id): Path<String>,
    ctx: RequestCtx,
) -> Result<Json<UserDto>, ProblemResponse> {
    let id = parse_user_id(&raw_id, &ctx)?;
    info!("Getting user with id: {}", id);

    match svc.get_user(id).await {
        Ok(user) => Ok(Json(UserDto::from(user))),
        Err(e) => {
            error!("Failed to get user {}: {}", id, e);
            Err(map_domain_error(&e, &ctx))
        }
    }
}

/// Create a new user
pub async fn create_user(
    Extension(svc): Extension<Arc<Service>>,
    ctx: RequestCtx,
    body: Result<Json<CreateUserReq>, JsonRejection>,
) -> Result<(StatusCode, Json<UserDto>), ProblemResponse> {
    let Json(req_body) = body.map_err(|e| invalid_body(rejection_detail(&e), &ctx))?;
    info!("Creating user: {:?}", req_body);

    match svc.create_user(req_body.into()).await {
        Ok(user) => Ok((StatusCode::CREATED, Json(UserDto::from(user)))),
        Err(e) => {
            error!("Failed to create user: {}", e);
            Err(map_domain_error(&e, &ctx))
        }
    }
}

/// Update an existing user; serves both PUT and PATCH
pub async fn update_user(
    Extension(svc): Extension<Arc<Service>>,
    Path(raw_id): Path<String>,
    ctx: RequestCtx,
    body: Result<Json<UpdateUserReq>, JsonRejection>,
) -> Result<Json<UserDto>, ProblemResponse> {
    let id = parse_user_id(&raw_id, &ctx)?;
    let Json(req_body) = body.map_err(|e| invalid_body(rejection_detail(&e), &ctx))?;
    info!("Updating user {} with: {:?}", id, req_body);

    let result = match req_body.into_patch() {
        Ok(patch) => svc.update_user(id, patch).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(user) => Ok(Json(UserDto::from(user))),
        Err(e) => {
            error!("Failed to update user {}: {}", id, e);
            Err(map_domain_error(&e, &ctx))
        }
    }
}

/// Delete a user by ID
pub async fn delete_user(
    Extension(svc): Extension<Arc<Service>>,
    Path(raw_id): Path<String>,
    ctx: RequestCtx,
) -> Result<StatusCode, ProblemResponse> {
    let id = parse_user_id(&raw_id, &ctx)?;
    info!("Deleting user: {}", id);

    match svc.delete_user(id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => {
            error!("Failed to delete user {}: {}", id, e);
            Err(map_domain_error(&e, &ctx))
        }
    }
}

// No user can have an id that is not a UUID, so such a path is simply unknown.
fn parse_user_id(raw: &str, ctx: &RequestCtx) -> Result<Uuid, ProblemResponse> {
    Uuid::parse_str(raw).map_err(|_| {
        from_parts(
            StatusCode::NOT_FOUND,
            "USERS_NOT_FOUND",
            "User not found",
            format!("User with ID {raw} not found."),
            ctx,
        )
    })
}
