//! REST-level tests for the users_info module.
//!
//! Every scenario runs twice: once on the in-memory store and once on a
//! fresh `sqlite::memory:` database with migrations applied.

use std::sync::{Arc, Mutex};

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use sea_orm::{Database, DatabaseConnection};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use users_info::{config::UsersInfoConfig, domain::repo::UsersRepository, UsersInfo};

/// Minimal OpenAPI registry stub for tests. It records nothing.
struct MockOpenApiRegistry;

impl modkit::api::OpenApiRegistry for MockOpenApiRegistry {
    fn register_operation(&self, _spec: &modkit::api::OperationSpec) {}

    fn ensure_schema_raw(&self, root_name: &str, _schemas: modkit::api::SchemaCollection) -> String {
        root_name.to_string()
    }
}

/// Registry that keeps every registered operation for inspection.
#[derive(Default)]
struct RecordingRegistry {
    operations: Mutex<Vec<modkit::api::OperationSpec>>,
}

impl modkit::api::OpenApiRegistry for RecordingRegistry {
    fn register_operation(&self, spec: &modkit::api::OperationSpec) {
        self.operations.lock().unwrap().push(spec.clone());
    }

    fn ensure_schema_raw(&self, root_name: &str, _schemas: modkit::api::SchemaCollection) -> String {
        root_name.to_string()
    }
}

async fn create_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to test database");
    UsersInfo::migrate(&db)
        .await
        .expect("Failed to run migrations");
    db
}

fn router_for(module: &UsersInfo) -> Router {
    module
        .register_rest(Router::new(), &MockOpenApiRegistry)
        .expect("routes register")
}

async fn memory_router() -> Router {
    router_for(&UsersInfo::in_memory(&UsersInfoConfig::default()))
}

async fn sqlite_router() -> Router {
    let db = create_test_db().await;
    router_for(&UsersInfo::persisted(db, &UsersInfoConfig::default()))
}

async fn routers() -> Vec<(&'static str, Router)> {
    vec![
        ("memory", memory_router().await),
        ("sqlite", sqlite_router().await),
    ]
}

async fn call(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(v) => {
            req = req.header(header::CONTENT_TYPE, "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };
    let resp = router
        .clone()
        .oneshot(req.body(body).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn alice() -> Value {
    json!({
        "username": "alice",
        "email": "alice@example.com",
        "full_name": "Alice Liddell",
        "department": "Eng"
    })
}

#[tokio::test]
async fn full_crud_scenario() {
    for (store, router) in routers().await {
        let (status, created) = call(&router, Method::POST, "/users", Some(alice())).await;
        assert_eq!(status, StatusCode::CREATED, "{store}");
        let id = created["id"].as_str().unwrap().to_string();
        assert_eq!(created["username"], "alice");
        assert_eq!(created["created_at"], created["updated_at"]);

        let (status, dup) = call(&router, Method::POST, "/users", Some(alice())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{store}");
        assert_eq!(dup["detail"], "Username 'alice' already exists.");

        let (status, fetched) = call(&router, Method::GET, &format!("/users/{id}"), None).await;
        assert_eq!(status, StatusCode::OK, "{store}");
        assert_eq!(fetched, created, "{store}: GET after POST must match");

        let (status, patched) = call(
            &router,
            Method::PATCH,
            &format!("/users/{id}"),
            Some(json!({ "department": "Research" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{store}");
        assert_eq!(patched["department"], "Research");
        assert_eq!(patched["full_name"], "Alice Liddell");

        let (status, body) = call(&router, Method::DELETE, &format!("/users/{id}"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT, "{store}");
        assert_eq!(body, Value::Null);

        let (status, problem) = call(&router, Method::GET, &format!("/users/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{store}");
        assert_eq!(problem["code"], "USERS_NOT_FOUND");
        assert_eq!(problem["detail"], format!("User with ID {id} not found."));
    }
}

#[tokio::test]
async fn created_ids_are_unique() {
    for (store, router) in routers().await {
        let mut ids = std::collections::HashSet::new();
        for i in 0..5 {
            let (status, u) = call(
                &router,
                Method::POST,
                "/users/",
                Some(json!({ "username": format!("u{i}"), "email": format!("u{i}@example.com") })),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED, "{store}");
            assert!(ids.insert(u["id"].as_str().unwrap().to_string()));
        }
        assert_eq!(ids.len(), 5);
    }
}

#[tokio::test]
async fn duplicate_email_is_rejected_with_400() {
    for (store, router) in routers().await {
        call(&router, Method::POST, "/users", Some(alice())).await;
        let (status, problem) = call(
            &router,
            Method::POST,
            "/users",
            Some(json!({ "username": "other", "email": "alice@example.com" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{store}");
        assert_eq!(problem["code"], "USERS_EMAIL_CONFLICT");
    }
}

#[tokio::test]
async fn list_applies_skip_and_limit_in_creation_order() {
    for (store, router) in routers().await {
        for name in ["a", "b", "c"] {
            call(
                &router,
                Method::POST,
                "/users",
                Some(json!({ "username": name, "email": format!("{name}@example.com") })),
            )
            .await;
        }

        let names = |v: &Value| {
            v.as_array()
                .unwrap()
                .iter()
                .map(|u| u["username"].as_str().unwrap().to_string())
                .collect::<Vec<_>>()
        };

        let (status, all) = call(&router, Method::GET, "/users", None).await;
        assert_eq!(status, StatusCode::OK, "{store}");
        assert_eq!(names(&all), ["a", "b", "c"], "{store}");

        let (_, window) = call(&router, Method::GET, "/users/?skip=1&limit=1", None).await;
        assert_eq!(names(&window), ["b"], "{store}");

        let (status, empty) = call(&router, Method::GET, "/users?skip=10", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(empty, json!([]));

        let (status, problem) = call(&router, Method::GET, "/users?limit=-1", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{store}");
        assert_eq!(problem["code"], "USERS_INVALID_QUERY");
    }
}

#[tokio::test]
async fn list_accepts_windows_beyond_signed_range() {
    for (store, router) in routers().await {
        call(&router, Method::POST, "/users", Some(alice())).await;

        let (status, all) = call(&router, Method::GET, &format!("/users?limit={}", u64::MAX), None).await;
        assert_eq!(status, StatusCode::OK, "{store}");
        assert_eq!(all.as_array().map(Vec::len), Some(1), "{store}");

        let far = i64::MAX as u64 + 1;
        let (status, empty) = call(&router, Method::GET, &format!("/users?skip={far}"), None).await;
        assert_eq!(status, StatusCode::OK, "{store}");
        assert_eq!(empty, json!([]), "{store}");
    }
}

#[test]
fn collection_operations_document_trailing_slash_alias() {
    let registry = RecordingRegistry::default();
    let module = UsersInfo::in_memory(&UsersInfoConfig::default());
    module
        .register_rest(Router::new(), &registry)
        .expect("routes register");

    let ops = registry.operations.lock().unwrap();
    for method in [Method::GET, Method::POST] {
        let op = ops
            .iter()
            .find(|op| op.method == method && op.path == "/users")
            .expect("collection operation registered");
        let description = op.description.as_deref().unwrap_or_default();
        assert!(description.contains("/users/"), "{method}: {description}");
    }
    assert!(!ops.iter().any(|op| op.path == "/users/"));
}

#[tokio::test]
async fn empty_update_only_refreshes_updated_at() {
    for (store, router) in routers().await {
        let (_, created) = call(&router, Method::POST, "/users", Some(alice())).await;
        let id = created["id"].as_str().unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        let (status, updated) =
            call(&router, Method::PUT, &format!("/users/{id}"), Some(json!({}))).await;
        assert_eq!(status, StatusCode::OK, "{store}");
        for field in ["id", "username", "email", "full_name", "department", "created_at"] {
            assert_eq!(updated[field], created[field], "{store}: {field}");
        }
        assert_ne!(updated["updated_at"], created["updated_at"], "{store}");
    }
}

#[tokio::test]
async fn null_clears_optional_fields_but_not_required_ones() {
    for (store, router) in routers().await {
        let (_, created) = call(&router, Method::POST, "/users", Some(alice())).await;
        let uri = format!("/users/{}", created["id"].as_str().unwrap());

        let (status, updated) =
            call(&router, Method::PATCH, &uri, Some(json!({ "full_name": null }))).await;
        assert_eq!(status, StatusCode::OK, "{store}");
        assert!(updated["full_name"].is_null());
        assert_eq!(updated["department"], "Eng");

        let (status, problem) =
            call(&router, Method::PATCH, &uri, Some(json!({ "username": null }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{store}");
        assert_eq!(problem["code"], "USERS_VALIDATION");
    }
}

#[tokio::test]
async fn server_managed_fields_in_update_are_ignored() {
    for (store, router) in routers().await {
        let (_, created) = call(&router, Method::POST, "/users", Some(alice())).await;
        let id = created["id"].as_str().unwrap();

        let (status, updated) = call(
            &router,
            Method::PUT,
            &format!("/users/{id}"),
            Some(json!({
                "id": Uuid::new_v4(),
                "created_at": "2000-01-01T00:00:00Z",
                "email": "alice@new.example.com"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{store}");
        assert_eq!(updated["id"], created["id"]);
        assert_eq!(updated["created_at"], created["created_at"]);
        assert_eq!(updated["email"], "alice@new.example.com");
    }
}

#[tokio::test]
async fn length_caps_are_enforced() {
    for (store, router) in routers().await {
        let (status, problem) = call(
            &router,
            Method::POST,
            "/users",
            Some(json!({ "username": "x".repeat(101), "email": "x@example.com" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{store}");
        assert_eq!(problem["code"], "USERS_VALIDATION");

        let (_, created) = call(&router, Method::POST, "/users", Some(alice())).await;
        let uri = format!("/users/{}", created["id"].as_str().unwrap());
        let (status, _) = call(
            &router,
            Method::PATCH,
            &uri,
            Some(json!({ "department": "d".repeat(256) })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{store}");

        let (status, _) = call(
            &router,
            Method::PATCH,
            &uri,
            Some(json!({ "department": "d".repeat(255) })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{store}");
    }
}

#[tokio::test]
async fn renaming_onto_another_users_username_conflicts() {
    for (store, router) in routers().await {
        call(&router, Method::POST, "/users", Some(alice())).await;
        let (_, bob) = call(
            &router,
            Method::POST,
            "/users",
            Some(json!({ "username": "bob", "email": "bob@example.com" })),
        )
        .await;
        let uri = format!("/users/{}", bob["id"].as_str().unwrap());

        let (status, problem) =
            call(&router, Method::PATCH, &uri, Some(json!({ "username": "alice" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{store}");
        assert_eq!(problem["code"], "USERS_USERNAME_CONFLICT");

        // Keeping one's own username is not a conflict.
        let (status, _) =
            call(&router, Method::PATCH, &uri, Some(json!({ "username": "bob" }))).await;
        assert_eq!(status, StatusCode::OK, "{store}");
    }
}

#[tokio::test]
async fn unknown_ids_are_not_found() {
    for (store, router) in routers().await {
        let missing = Uuid::new_v4();
        for method in [Method::GET, Method::DELETE] {
            let (status, _) = call(&router, method, &format!("/users/{missing}"), None).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{store}");
        }
        let (status, _) = call(
            &router,
            Method::PUT,
            &format!("/users/{missing}"),
            Some(json!({ "department": "x" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{store}");

        let (status, problem) = call(&router, Method::GET, "/users/not-a-uuid", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{store}");
        assert_eq!(problem["instance"], "/users/not-a-uuid");
    }
}

#[tokio::test]
async fn malformed_body_yields_problem_document() {
    let router = memory_router().await;
    let req = Request::builder()
        .method(Method::POST)
        .uri("/users")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-request-id", "req-42")
        .body(Body::from("{\"username\":"))
        .unwrap();
    let resp = router.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        resp.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/problem+json"
    );
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let problem: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(problem["code"], "USERS_INVALID_BODY");
    assert_eq!(problem["request_id"], "req-42");
}

struct FailingRepo;

#[async_trait::async_trait]
impl UsersRepository for FailingRepo {
    async fn list(&self, _: u64, _: u64) -> anyhow::Result<Vec<users_info::model::User>> {
        anyhow::bail!("connection reset by peer")
    }
    async fn find_by_id(&self, _: Uuid) -> anyhow::Result<Option<users_info::model::User>> {
        anyhow::bail!("connection reset by peer")
    }
    async fn find_by(
        &self,
        _: users_info::domain::repo::UniqueField,
        _: &str,
    ) -> anyhow::Result<Option<users_info::model::User>> {
        anyhow::bail!("connection reset by peer")
    }
    async fn insert(&self, _: users_info::model::User) -> anyhow::Result<users_info::model::User> {
        anyhow::bail!("connection reset by peer")
    }
    async fn update(&self, _: users_info::model::User) -> anyhow::Result<users_info::model::User> {
        anyhow::bail!("connection reset by peer")
    }
    async fn delete(&self, _: Uuid) -> anyhow::Result<bool> {
        anyhow::bail!("connection reset by peer")
    }
}

#[tokio::test]
async fn storage_failure_is_a_generic_500() {
    let module = UsersInfo::with_repo(Arc::new(FailingRepo), &UsersInfoConfig::default());
    let router = router_for(&module);

    let (status, problem) = call(&router, Method::GET, "/users", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(problem["code"], "INTERNAL_DB");
    assert!(!problem.to_string().contains("connection reset"));
}
