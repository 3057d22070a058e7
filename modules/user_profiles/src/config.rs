use serde::{Deserialize, Serialize};

/// Configuration for the user_profiles module
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserProfilesConfig {
    /// Insert the demo user on start when it is missing.
    #[serde(default)]
    pub seed_demo_user: bool,
}
