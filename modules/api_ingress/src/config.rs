use serde::{Deserialize, Serialize};

/// API ingress configuration (`modules.api_ingress`)
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ApiIngressConfig {
    /// Serve `/openapi.json` and `/docs`.
    #[serde(default = "default_true")]
    pub enable_docs: bool,
    /// Permissive CORS (any origin, method and header).
    #[serde(default = "default_true")]
    pub cors_enabled: bool,
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

impl Default for ApiIngressConfig {
    fn default() -> Self {
        Self {
            enable_docs: true,
            cors_enabled: true,
            body_limit_bytes: default_body_limit(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_body_limit() -> usize {
    16 * 1024 * 1024
}
