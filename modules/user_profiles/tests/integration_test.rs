//! REST-level tests for the user_profiles module over both stores.

use std::sync::Arc;

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

use user_profiles::{
    config::UserProfilesConfig, domain::repo::ProfilesRepository, domain::seed::DEMO_USER_ID,
    model::UserProfile, UserProfiles,
};

struct MockOpenApiRegistry;

impl modkit::api::OpenApiRegistry for MockOpenApiRegistry {
    fn register_operation(&self, _spec: &modkit::api::OperationSpec) {}

    fn ensure_schema_raw(&self, root_name: &str, _schemas: modkit::api::SchemaCollection) -> String {
        root_name.to_string()
    }
}

async fn create_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to test database");
    UserProfiles::migrate(&db)
        .await
        .expect("Failed to run migrations");
    db
}

fn router_for(module: &UserProfiles) -> Router {
    module
        .register_rest(Router::new(), &MockOpenApiRegistry)
        .expect("routes register")
}

async fn routers() -> Vec<(&'static str, Router)> {
    let memory = UserProfiles::in_memory(UserProfilesConfig::default());
    let sqlite = UserProfiles::persisted(create_test_db().await, UserProfilesConfig::default());
    vec![("memory", router_for(&memory)), ("sqlite", router_for(&sqlite))]
}

async fn send(router: &Router, method: Method, uri: &str, body: Body) -> (StatusCode, Value) {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body)
        .unwrap();
    let resp = router.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn call(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let body = body.map_or_else(Body::empty, |v| Body::from(v.to_string()));
    send(router, method, uri, body).await
}

async fn create(router: &Router, body: Value) -> Value {
    let (status, created) = call(router, Method::POST, "/api/users", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    created
}

fn jane() -> Value {
    json!({
        "username": "jane",
        "email": "jane@example.com",
        "profile": { "bio": "a", "avatarUrl": "x" },
        "tags": ["a", "b"],
        "preferences": { "theme": "dark", "notifications": { "email": true } }
    })
}

#[tokio::test]
async fn create_then_get_round_trips() {
    for (store, router) in routers().await {
        let created = create(&router, jane()).await;
        assert!(Uuid::parse_str(created["userId"].as_str().unwrap()).is_ok());
        assert_eq!(created["isActive"], true);
        assert!(created["lastLogin"].is_null());

        let uri = format!("/api/users/{}", created["userId"].as_str().unwrap());
        let (status, fetched) = call(&router, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::OK, "{store}");
        assert_eq!(fetched, created, "{store}");
    }
}

#[tokio::test]
async fn patch_merges_profile_and_replaces_tags() {
    for (store, router) in routers().await {
        let created = create(&router, jane()).await;
        let uri = format!("/api/users/{}", created["userId"].as_str().unwrap());

        let (status, updated) = call(
            &router,
            Method::PATCH,
            &uri,
            Some(json!({
                "profile": { "bio": "b" },
                "tags": ["c"],
                "preferences": { "notifications": { "sms": true } },
                "isActive": "nope",
                "createdAt": "1999-01-01T00:00:00Z",
                "unknown": 1
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{store}");
        assert_eq!(updated["profile"], json!({ "bio": "b", "avatarUrl": "x" }));
        assert_eq!(updated["tags"], json!(["c"]));
        assert_eq!(
            updated["preferences"],
            json!({ "theme": "dark", "notifications": { "sms": true } })
        );
        assert_eq!(updated["isActive"], true);
        assert_eq!(updated["createdAt"], created["createdAt"]);
        assert!(updated.get("unknown").is_none());

        let (_, fetched) = call(&router, Method::GET, &uri, None).await;
        assert_eq!(fetched, updated, "{store}: update must be persisted");
    }
}

#[tokio::test]
async fn patch_refreshes_last_login_even_when_supplied() {
    // The supplied value is parsed and applied, then overwritten by the
    // refresh that every update performs.
    for (store, router) in routers().await {
        let created = create(&router, jane()).await;
        let uri = format!("/api/users/{}", created["userId"].as_str().unwrap());
        let before = chrono::Utc::now();

        let (_, updated) = call(
            &router,
            Method::PATCH,
            &uri,
            Some(json!({ "lastLogin": "2001-02-03T04:05:06Z" })),
        )
        .await;
        let p: UserProfile = serde_json::from_value(updated).unwrap();
        assert!(p.last_login.unwrap() >= before, "{store}");

        let (status, updated) = call(
            &router,
            Method::PUT,
            &uri,
            Some(json!({ "lastLogin": "garbage" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{store}");
        assert!(!updated["lastLogin"].is_null());
    }
}

#[tokio::test]
async fn empty_object_is_a_valid_update() {
    for (store, router) in routers().await {
        let created = create(&router, jane()).await;
        let uri = format!("/api/users/{}", created["userId"].as_str().unwrap());
        let (status, updated) = call(&router, Method::PATCH, &uri, Some(json!({}))).await;
        assert_eq!(status, StatusCode::OK, "{store}");
        assert_eq!(updated["profile"], created["profile"]);
    }
}

#[tokio::test]
async fn invalid_payloads_are_bad_requests() {
    for (store, router) in routers().await {
        let created = create(&router, jane()).await;
        let uri = format!("/api/users/{}", created["userId"].as_str().unwrap());

        for body in [Body::empty(), Body::from("{oops"), Body::from("[1,2]")] {
            let (status, err) = send(&router, Method::PATCH, &uri, body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{store}");
            assert_eq!(err, json!({ "code": "BAD_REQUEST", "message": "Invalid JSON payload" }));
        }

        let (status, err) = call(
            &router,
            Method::POST,
            "/api/users",
            Some(json!({ "username": "no-email" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{store}");
        assert_eq!(err["code"], "BAD_REQUEST");
    }
}

#[tokio::test]
async fn unknown_user_is_not_found_before_body_is_checked() {
    for (store, router) in routers().await {
        let uri = format!("/api/users/{}", Uuid::new_v4());
        let (status, err) = send(&router, Method::PATCH, &uri, Body::from("{oops")).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{store}");
        assert_eq!(err, json!({ "code": "USER_NOT_FOUND", "message": "User not found" }));

        let (status, _) = call(&router, Method::GET, "/api/users/not-a-uuid", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{store}");
    }
}

#[tokio::test]
async fn duplicate_client_supplied_id_is_rejected() {
    for (store, router) in routers().await {
        let id = Uuid::new_v4();
        let mut body = jane();
        body["userId"] = json!(id);
        create(&router, body.clone()).await;

        let (status, err) = call(&router, Method::POST, "/api/users", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{store}");
        assert_eq!(err["code"], "USER_ALREADY_EXISTS");
    }
}

#[tokio::test]
async fn username_is_not_unique_in_blob_form() {
    for (store, router) in routers().await {
        let a = create(&router, jane()).await;
        let b = create(&router, jane()).await;
        assert_ne!(a["userId"], b["userId"], "{store}");
    }
}

#[tokio::test]
async fn ping_answers_on_both_paths() {
    let (_, router) = routers().await.remove(0);
    for path in ["/ping", "/api/ping"] {
        let (status, body) = call(&router, Method::GET, path, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "message": "pong" }));
    }
}

#[tokio::test]
async fn start_seeds_demo_user_when_configured() {
    let module = UserProfiles::in_memory(UserProfilesConfig {
        seed_demo_user: true,
    });
    module.start().await.unwrap();
    assert!(!module.seed_demo_user().await.unwrap());

    let router = router_for(&module);
    let (status, demo) = call(&router, Method::GET, &format!("/api/users/{DEMO_USER_ID}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(demo["username"], "testuser");
    assert_eq!(demo["profile"]["address"]["city"], "Anytown");
    assert_eq!(demo["tags"], json!(["tester", "sample"]));
    assert_eq!(demo["preferences"]["notifications"], true);
}

#[tokio::test]
async fn seeding_the_database_store_is_idempotent() {
    let db = create_test_db().await;
    let module = UserProfiles::persisted(db.clone(), UserProfilesConfig::default());
    assert!(module.seed_demo_user().await.unwrap());

    let again = UserProfiles::persisted(db, UserProfilesConfig::default());
    assert!(!again.seed_demo_user().await.unwrap());
}

/// Reads succeed, writes fail: an update reaches storage and is refused there.
struct ReadOnlyRepo {
    profile: UserProfile,
}

#[async_trait::async_trait]
impl ProfilesRepository for ReadOnlyRepo {
    async fn find_by_id(&self, user_id: Uuid) -> anyhow::Result<Option<UserProfile>> {
        Ok((user_id == self.profile.user_id).then(|| self.profile.clone()))
    }

    async fn upsert(&self, _profile: UserProfile) -> anyhow::Result<()> {
        anyhow::bail!("database is locked")
    }
}

#[tokio::test]
async fn storage_failure_on_update_is_a_generic_500() {
    let profile = UserProfile::new(Uuid::new_v4(), "ro", "ro@example.com");
    let uri = format!("/api/users/{}", profile.user_id);
    let module = UserProfiles::with_repo(
        Arc::new(ReadOnlyRepo { profile }),
        UserProfilesConfig::default(),
    );
    let router = router_for(&module);

    let (status, err) = call(&router, Method::PATCH, &uri, Some(json!({ "tags": [] }))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(err["code"], "DB_ERROR");
    assert!(!err.to_string().contains("locked"));
}
