//! REST host: collects module routes and operation specs, adds the service
//! front door (`/`, `/health`, `/openapi.json`, `/docs`) and the shared
//! middleware stack, then serves the result.

use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use axum::http::{header, Method};
use axum::response::IntoResponse;
use axum::{middleware::from_fn, routing::get, Router};
use dashmap::DashMap;
use modkit::api::{OpenApiRegistry, OperationSpec, ParamLocation, SchemaCollection};
use parking_lot::RwLock;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
};

mod config;
mod model;
mod openapi;
pub mod request_id;
mod web;

pub use config::ApiIngressConfig;
use model::ComponentsRegistry;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Owns the HTTP surface and implements [`OpenApiRegistry`] so modules can
/// describe their operations while registering routes.
pub struct ApiIngress {
    config: ApiIngressConfig,
    request_timeout: Duration,
    components_registry: RwLock<ComponentsRegistry>,

    // Duplicate detection (per (method, path) and per handler id)
    registered_routes: DashMap<(Method, String), ()>,
    registered_handlers: DashMap<String, ()>,

    // Store operation specs for OpenAPI generation
    operation_specs: DashMap<String, OperationSpec>,
}

impl Default for ApiIngress {
    fn default() -> Self {
        Self::new(ApiIngressConfig::default())
    }
}

impl ApiIngress {
    pub fn new(config: ApiIngressConfig) -> Self {
        Self {
            config,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            components_registry: RwLock::new(ComponentsRegistry::default()),
            registered_routes: DashMap::new(),
            registered_handlers: DashMap::new(),
            operation_specs: DashMap::new(),
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn operation_count(&self) -> usize {
        self.operation_specs.len()
    }

    /// Finish the router once every module has registered its routes.
    ///
    /// Middleware order (outermost to innermost):
    /// SetRequestId -> PropagateRequestId -> Trace -> push_req_id_to_extensions
    /// -> Timeout -> CORS -> BodyLimit
    pub fn build_router(&self, modules: Router) -> Result<Router> {
        let mut router = modules
            .route("/", get(web::root))
            .route("/health", get(web::health_check));

        if self.config.enable_docs {
            let op_count = self.operation_specs.len();
            tracing::info!("Emitting OpenAPI with {} operations", op_count);

            // Build once, serve as static JSON (no per-request work)
            let openapi_value = Arc::new(serde_json::to_value(self.build_openapi()?)?);
            router = router
                .route(
                    "/openapi.json",
                    get(move || {
                        let v = openapi_value.clone();
                        async move {
                            ([(header::CACHE_CONTROL, "no-store")], axum::Json((*v).clone()))
                                .into_response()
                        }
                    }),
                )
                .route("/docs", get(web::serve_docs));
        }

        // Layers wrap everything added so far; the last one added runs first.
        router = router.layer(RequestBodyLimitLayer::new(self.config.body_limit_bytes));
        if self.config.cors_enabled {
            router = router.layer(CorsLayer::permissive());
        }
        router = router.layer(TimeoutLayer::new(self.request_timeout));
        router = router.layer(from_fn(request_id::push_req_id_to_extensions));
        router = router.layer(request_id::create_trace_layer());

        let x_request_id = request_id::header();
        router = router.layer(PropagateRequestIdLayer::new(x_request_id.clone()));
        router = router.layer(SetRequestIdLayer::new(x_request_id, request_id::MakeReqId));

        Ok(router)
    }

    /// Build a schema value for content type + optional component name.
    fn make_schema(
        components: &ComponentsRegistry,
        content_type: &str,
        schema_name: Option<&str>,
    ) -> Value {
        if let Some(name) = schema_name {
            if components.has_schema(name) {
                return json!({ "$ref": format!("#/components/schemas/{name}") });
            }
        }
        match content_type {
            "application/json" => json!({ "type": "object" }),
            "text/plain" | "text/html" => json!({ "type": "string" }),
            _ => json!({}),
        }
    }

    fn make_content_obj(
        components: &ComponentsRegistry,
        content_type: &str,
        schema_name: Option<&str>,
    ) -> Value {
        let schema = Self::make_schema(components, content_type, schema_name);
        let mut content = Map::new();
        content.insert(content_type.to_string(), json!({ "schema": schema }));
        Value::Object(content)
    }

    fn operation_json(components: &ComponentsRegistry, spec: &OperationSpec) -> Value {
        let mut operation = Map::new();

        // Prefer explicit operation_id, fallback to handler_id
        let op_id = spec
            .operation_id
            .clone()
            .unwrap_or_else(|| spec.handler_id.clone());
        operation.insert("operationId".into(), Value::String(op_id));

        if let Some(summary) = &spec.summary {
            operation.insert("summary".into(), Value::String(summary.clone()));
        }
        if let Some(description) = &spec.description {
            operation.insert("description".into(), Value::String(description.clone()));
        }
        if !spec.tags.is_empty() {
            operation.insert("tags".into(), json!(spec.tags));
        }

        if let Some(req) = &spec.request_body {
            let mut rb = Map::new();
            if let Some(desc) = &req.description {
                rb.insert("description".into(), Value::String(desc.clone()));
            }
            rb.insert("required".into(), Value::Bool(req.required));
            rb.insert(
                "content".into(),
                Self::make_content_obj(components, req.content_type, req.schema_name.as_deref()),
            );
            operation.insert("requestBody".into(), Value::Object(rb));
        }

        let mut responses = Map::new();
        for resp in &spec.responses {
            let mut obj = Map::new();
            obj.insert("description".into(), Value::String(resp.description.clone()));
            if let Some(content_type) = resp.content_type {
                obj.insert(
                    "content".into(),
                    Self::make_content_obj(components, content_type, resp.schema_name.as_deref()),
                );
            }
            responses.insert(resp.status.to_string(), Value::Object(obj));
        }
        operation.insert("responses".into(), Value::Object(responses));

        if !spec.params.is_empty() {
            let parameters: Vec<Value> = spec
                .params
                .iter()
                .map(|p| {
                    let location = match p.location {
                        ParamLocation::Path => "path",
                        ParamLocation::Query => "query",
                    };
                    // OpenAPI requires all path params to be required.
                    let required = p.location == ParamLocation::Path || p.required;
                    let mut param = json!({
                        "name": p.name,
                        "in": location,
                        "required": required,
                        "schema": { "type": p.param_type },
                    });
                    if let (Some(desc), Value::Object(m)) = (&p.description, &mut param) {
                        m.insert("description".into(), Value::String(desc.clone()));
                    }
                    param
                })
                .collect();
            operation.insert("parameters".into(), Value::Array(parameters));
        }

        Value::Object(operation)
    }

    /// Build OpenAPI specification from registered operations and components.
    pub fn build_openapi(&self) -> Result<openapi::OpenApi> {
        let components_registry = self.components_registry.read();

        let mut paths_map: BTreeMap<String, BTreeMap<String, Value>> = BTreeMap::new();
        for entry in self.operation_specs.iter() {
            let spec = entry.value();
            paths_map
                .entry(spec.path.clone())
                .or_default()
                .insert(
                    spec.method.as_str().to_lowercase(),
                    Self::operation_json(&components_registry, spec),
                );
        }

        let components = openapi::OpenApiComponents {
            schemas: components_registry.schemas.clone(),
        };

        Ok(openapi::OpenApi {
            openapi: "3.0.3",
            info: openapi::OpenApiInfo {
                title: "User Management API",
                version: env!("CARGO_PKG_VERSION").to_string(),
                description: Some("Typed users under /users, free-form profiles under /api/users"),
            },
            paths: serde_json::to_value(paths_map)?,
            components: Some(components),
        })
    }

    /// Serve `router` on `listener` until `shutdown` resolves.
    pub async fn serve<F>(listener: TcpListener, router: Router, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        tracing::info!("HTTP server bound on {}", listener.local_addr()?);
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| anyhow::anyhow!(e))?;
        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

impl OpenApiRegistry for ApiIngress {
    fn register_operation(&self, spec: &OperationSpec) {
        // Reject duplicates with "first wins" policy (second registration = programmer error).
        if self
            .registered_handlers
            .insert(spec.handler_id.clone(), ())
            .is_some()
        {
            tracing::error!(
                handler_id = %spec.handler_id,
                method = %spec.method.as_str(),
                path = %spec.path,
                "Duplicate handler_id detected; ignoring subsequent registration"
            );
            return;
        }

        let route_key = (spec.method.clone(), spec.path.clone());
        if self.registered_routes.insert(route_key, ()).is_some() {
            tracing::error!(
                method = %spec.method.as_str(),
                path = %spec.path,
                "Duplicate (method, path) detected; ignoring subsequent registration"
            );
            return;
        }

        let operation_key = format!("{}:{}", spec.method.as_str(), spec.path);
        self.operation_specs.insert(operation_key.clone(), spec.clone());

        tracing::debug!(
            handler_id = %spec.handler_id,
            operation_key = %operation_key,
            total_operations = self.operation_specs.len(),
            "Registered API operation"
        );
    }

    fn ensure_schema_raw(&self, name: &str, schemas: SchemaCollection) -> String {
        let mut reg = self.components_registry.write();
        for (schema_name, schema) in schemas {
            match serde_json::to_value(&schema) {
                Ok(value) => {
                    if reg.register_schema(schema_name.clone(), value) {
                        tracing::debug!(schema_name = %schema_name, "Registered schema");
                    }
                }
                Err(e) => {
                    tracing::error!(schema_name = %schema_name, error = %e, "Failed to serialize schema to JSON");
                }
            }
        }
        name.to_string()
    }
}
