use std::sync::Arc;

use axum::{Extension, Router};
use modkit::api::{Missing, OpenApiRegistry, OperationBuilder};

use crate::api::rest::{dto, handlers};
use crate::contract::model::UserProfile;
use crate::domain::service::Service;

pub fn register_routes(
    mut router: Router,
    openapi: &dyn OpenApiRegistry,
    service: Arc<Service>,
) -> anyhow::Result<Router> {
    for path in ["/ping", "/api/ping"] {
        router = OperationBuilder::<Missing, Missing, ()>::get(path)
            .operation_id(format!("user_profiles.ping{}", path.replace('/', "_")))
            .summary("Liveness ping")
            .tag("profiles")
            .handler(handlers::ping)
            .json_response_with_schema::<dto::PingResponse>(openapi, 200, "pong")
            .register(router, openapi);
    }

    // POST /api/users - Create a profile
    router = OperationBuilder::<Missing, Missing, ()>::post("/api/users")
        .operation_id("user_profiles.create_profile")
        .summary("Create a user profile")
        .description("username and email are required; userId is generated unless supplied")
        .tag("profiles")
        .json_request_any("User profile document")
        .handler(handlers::create_profile)
        .json_response_with_schema::<UserProfile>(openapi, 201, "Created profile")
        .error_response_with_schema::<dto::ErrorBody>(openapi, 400, "Invalid payload or duplicate userId")
        .error_response_with_schema::<dto::ErrorBody>(openapi, 500, "Database error")
        .register(router, openapi);

    // GET /api/users/{id} - Get a profile
    router = OperationBuilder::<Missing, Missing, ()>::get("/api/users/{id}")
        .operation_id("user_profiles.get_profile")
        .summary("Get user profile by userId")
        .tag("profiles")
        .path_param("id", "User UUID")
        .handler(handlers::get_profile)
        .json_response_with_schema::<UserProfile>(openapi, 200, "Profile found")
        .error_response_with_schema::<dto::ErrorBody>(openapi, 404, "User not found")
        .register(router, openapi);

    // PATCH and PUT /api/users/{id} - Merge update
    router = OperationBuilder::<Missing, Missing, ()>::patch("/api/users/{id}")
        .operation_id("user_profiles.update_profile")
        .summary("Update user profile")
        .description("profile/preferences are merged one level deep, tags replaced, lastLogin refreshed")
        .tag("profiles")
        .path_param("id", "User UUID")
        .json_request_any("Partial profile document")
        .handler(handlers::update_profile)
        .json_response_with_schema::<UserProfile>(openapi, 200, "Updated profile")
        .error_response_with_schema::<dto::ErrorBody>(openapi, 400, "Invalid JSON payload")
        .error_response_with_schema::<dto::ErrorBody>(openapi, 404, "User not found")
        .error_response_with_schema::<dto::ErrorBody>(openapi, 500, "Database error")
        .register(router, openapi);

    router = OperationBuilder::<Missing, Missing, ()>::put("/api/users/{id}")
        .operation_id("user_profiles.replace_profile")
        .summary("Update user profile")
        .description("Alias of PATCH /api/users/{id}")
        .tag("profiles")
        .path_param("id", "User UUID")
        .json_request_any("Partial profile document")
        .handler(handlers::update_profile)
        .json_response_with_schema::<UserProfile>(openapi, 200, "Updated profile")
        .error_response_with_schema::<dto::ErrorBody>(openapi, 400, "Invalid JSON payload")
        .error_response_with_schema::<dto::ErrorBody>(openapi, 404, "User not found")
        .error_response_with_schema::<dto::ErrorBody>(openapi, 500, "Database error")
        .register(router, openapi);

    router = router.layer(Extension(service));

    Ok(router)
}
