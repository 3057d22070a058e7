use std::sync::Arc;

use axum::routing::get;
use axum::{Extension, Router};
use modkit::api::{Missing, OpenApiRegistry, OperationBuilder};

use crate::api::rest::{dto, handlers};
use crate::domain::service::Service;

pub fn register_routes(
    mut router: Router,
    openapi: &dyn OpenApiRegistry,
    service: Arc<Service>,
) -> anyhow::Result<Router> {
    // GET /users - List users
    router = OperationBuilder::<Missing, Missing, ()>::get("/users")
        .operation_id("users_info.list_users")
        .summary("List users")
        .description("Users in creation order, windowed by skip/limit. Also served at /users/")
        .tag("users")
        .query_param_typed("skip", false, "Number of users to skip (default 0)", "integer")
        .query_param_typed("limit", false, "Maximum number of users to return (default 100)", "integer")
        .handler(handlers::list_users)
        .json_response_with_schema::<dto::UserListDto>(openapi, 200, "List of users")
        .problem_response(openapi, 400, "Bad Request")
        .problem_response(openapi, 500, "Internal Server Error")
        .register(router, openapi);

    // GET /users/{id} - Get a specific user
    router = OperationBuilder::<Missing, Missing, ()>::get("/users/{id}")
        .operation_id("users_info.get_user")
        .summary("Get user by ID")
        .description("Retrieve a specific user by their UUID")
        .tag("users")
        .path_param("id", "User UUID")
        .handler(handlers::get_user)
        .json_response_with_schema::<dto::UserDto>(openapi, 200, "User found")
        .problem_response(openapi, 404, "Not Found")
        .problem_response(openapi, 500, "Internal Server Error")
        .register(router, openapi);

    // POST /users - Create a new user
    router = OperationBuilder::<Missing, Missing, ()>::post("/users")
        .operation_id("users_info.create_user")
        .summary("Create a new user")
        .description("Create a user; username and email must be unused. Also served at /users/")
        .tag("users")
        .json_request::<dto::CreateUserReq>(openapi, "User creation data")
        .handler(handlers::create_user)
        .json_response_with_schema::<dto::UserDto>(openapi, 201, "Created user")
        .problem_response(openapi, 400, "Invalid data or duplicate username/email")
        .problem_response(openapi, 500, "Internal Server Error")
        .register(router, openapi);

    // PUT /users/{id} and PATCH /users/{id} - Partial update
    router = OperationBuilder::<Missing, Missing, ()>::put("/users/{id}")
        .operation_id("users_info.update_user")
        .summary("Update user")
        .description("Overwrite the fields present in the document")
        .tag("users")
        .path_param("id", "User UUID")
        .json_request::<dto::UpdateUserReq>(openapi, "User update data")
        .handler(handlers::update_user)
        .json_response_with_schema::<dto::UserDto>(openapi, 200, "Updated user")
        .problem_response(openapi, 400, "Invalid data or duplicate username/email")
        .problem_response(openapi, 404, "Not Found")
        .problem_response(openapi, 500, "Internal Server Error")
        .register(router, openapi);

    router = OperationBuilder::<Missing, Missing, ()>::patch("/users/{id}")
        .operation_id("users_info.patch_user")
        .summary("Patch user")
        .description("Same semantics as PUT /users/{id}")
        .tag("users")
        .path_param("id", "User UUID")
        .json_request::<dto::UpdateUserReq>(openapi, "User update data")
        .handler(handlers::update_user)
        .json_response_with_schema::<dto::UserDto>(openapi, 200, "Updated user")
        .problem_response(openapi, 400, "Invalid data or duplicate username/email")
        .problem_response(openapi, 404, "Not Found")
        .problem_response(openapi, 500, "Internal Server Error")
        .register(router, openapi);

    // DELETE /users/{id} - Delete a user
    router = OperationBuilder::<Missing, Missing, ()>::delete("/users/{id}")
        .operation_id("users_info.delete_user")
        .summary("Delete user")
        .description("Delete a user by their UUID")
        .tag("users")
        .path_param("id", "User UUID")
        .handler(handlers::delete_user)
        .empty_response(204, "User deleted")
        .problem_response(openapi, 404, "Not Found")
        .problem_response(openapi, 500, "Internal Server Error")
        .register(router, openapi);

    // Trailing-slash alias of the collection; documented once above.
    router = router.route(
        "/users/",
        get(handlers::list_users).post(handlers::create_user),
    );

    router = router.layer(Extension(service));

    Ok(router)
}
