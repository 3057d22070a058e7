use axum::http::StatusCode;
use modkit::api::problem::{Problem, ProblemResponse};
use modkit::RequestCtx;

use crate::domain::error::DomainError;

/// Helper to create a ProblemResponse with less boilerplate
pub fn from_parts(
    status: StatusCode,
    code: &str,
    title: &str,
    detail: impl Into<String>,
    ctx: &RequestCtx,
) -> ProblemResponse {
    let problem = Problem::new(status, title, detail)
        .with_type(format!("https://errors.example.com/{code}"))
        .with_code(code)
        .with_instance(ctx.path.as_str());

    let problem = match ctx.request_id.as_deref() {
        Some(id) => problem.with_request_id(id),
        None => problem,
    };

    ProblemResponse(problem)
}

/// Map domain error to RFC9457 ProblemResponse.
///
/// Duplicates are reported as 400, the status clients of this API expect.
pub fn map_domain_error(e: &DomainError, ctx: &RequestCtx) -> ProblemResponse {
    match e {
        DomainError::UserNotFound { .. } => from_parts(
            StatusCode::NOT_FOUND,
            "USERS_NOT_FOUND",
            "User not found",
            e.to_string(),
            ctx,
        ),
        DomainError::UsernameAlreadyExists { .. } => from_parts(
            StatusCode::BAD_REQUEST,
            "USERS_USERNAME_CONFLICT",
            "Username already exists",
            e.to_string(),
            ctx,
        ),
        DomainError::EmailAlreadyExists { .. } => from_parts(
            StatusCode::BAD_REQUEST,
            "USERS_EMAIL_CONFLICT",
            "Email already exists",
            e.to_string(),
            ctx,
        ),
        DomainError::InvalidEmail { .. } => from_parts(
            StatusCode::BAD_REQUEST,
            "USERS_INVALID_EMAIL",
            "Invalid email",
            e.to_string(),
            ctx,
        ),
        DomainError::Validation { .. } => from_parts(
            StatusCode::BAD_REQUEST,
            "USERS_VALIDATION",
            "Validation error",
            e.to_string(),
            ctx,
        ),
        DomainError::Database { .. } => {
            // Log the internal error details but don't expose them to the client
            tracing::error!(error = ?e, "Database error occurred");
            from_parts(
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_DB",
                "Internal error",
                "An internal database error occurred",
                ctx,
            )
        }
    }
}

/// 400 for a request body that could not be decoded.
pub fn invalid_body(detail: impl Into<String>, ctx: &RequestCtx) -> ProblemResponse {
    from_parts(
        StatusCode::BAD_REQUEST,
        "USERS_INVALID_BODY",
        "Invalid request body",
        detail,
        ctx,
    )
}

/// 400 for query parameters that could not be decoded.
pub fn invalid_query(detail: impl Into<String>, ctx: &RequestCtx) -> ProblemResponse {
    from_parts(
        StatusCode::BAD_REQUEST,
        "USERS_INVALID_QUERY",
        "Invalid query parameters",
        detail,
        ctx,
    )
}
