use serde::{Deserialize, Serialize};

/// Configuration for the users_info module
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UsersInfoConfig {
    /// Window size used by `GET /users` when `limit` is not given.
    #[serde(default = "default_list_limit")]
    pub default_list_limit: u64,
}

impl Default for UsersInfoConfig {
    fn default() -> Self {
        Self {
            default_list_limit: default_list_limit(),
        }
    }
}

fn default_list_limit() -> u64 {
    100
}
