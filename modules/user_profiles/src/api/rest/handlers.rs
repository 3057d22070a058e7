use std::sync::Arc;

use axum::{body::Bytes, extract::Path, http::StatusCode, Extension, Json};
use modkit::api::json::{parse_object, JsonBodyError};
use tracing::{error, info};
use uuid::Uuid;

use crate::api::rest::dto::PingResponse;
use crate::api::rest::error::ApiError;
use crate::contract::model::UserProfile;
use crate::domain::service::Service;

pub async fn ping() -> Json<PingResponse> {
    Json(PingResponse {
        message: "pong".to_string(),
    })
}

/// Create a profile from a JSON object
pub async fn create_profile(
    Extension(svc): Extension<Arc<Service>>,
    body: Bytes,
) -> Result<(StatusCode, Json<UserProfile>), ApiError> {
    let doc = parse_object(&body).map_err(body_error)?;

    match svc.create_profile(doc).await {
        Ok(profile) => Ok((StatusCode::CREATED, Json(profile))),
        Err(e) => {
            error!("Failed to create profile: {}", e);
            Err(e.into())
        }
    }
}

/// Get a profile by userId
pub async fn get_profile(
    Extension(svc): Extension<Arc<Service>>,
    Path(raw_id): Path<String>,
) -> Result<Json<UserProfile>, ApiError> {
    let id = parse_user_id(&raw_id)?;
    info!("Getting profile {}", id);

    svc.get_profile(id).await.map(Json).map_err(Into::into)
}

/// Merge a JSON object into a stored profile; serves both PATCH and PUT.
/// The lookup happens before the body is looked at.
pub async fn update_profile(
    Extension(svc): Extension<Arc<Service>>,
    Path(raw_id): Path<String>,
    body: Bytes,
) -> Result<Json<UserProfile>, ApiError> {
    let id = parse_user_id(&raw_id)?;
    let current = svc.get_profile(id).await?;
    let doc = parse_object(&body).map_err(body_error)?;
    info!("Updating profile {} with keys: {:?}", id, doc.keys().collect::<Vec<_>>());

    match svc.update_profile(current, doc).await {
        Ok(profile) => Ok(Json(profile)),
        Err(e) => {
            error!("Failed to update profile {}: {}", id, e);
            Err(e.into())
        }
    }
}

fn parse_user_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::not_found())
}

fn body_error(e: JsonBodyError) -> ApiError {
    info!("Rejected request body: {}", e);
    ApiError::bad_request("Invalid JSON payload")
}
