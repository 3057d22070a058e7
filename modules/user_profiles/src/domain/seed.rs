use serde_json::json;
use uuid::{uuid, Uuid};

use crate::contract::model::UserProfile;

/// Well-known id of the demo user.
pub const DEMO_USER_ID: Uuid = uuid!("a0eebc99-9c0b-4ef8-bb6d-6bb9bd380a11");

pub fn demo_profile() -> UserProfile {
    let mut p = UserProfile::new(DEMO_USER_ID, "testuser", "test@example.com");
    if let serde_json::Value::Object(profile) = json!({
        "fullName": "Test User",
        "bio": "A sample user for testing.",
        "avatarUrl": "https://example.com/avatar.png",
        "birthDate": "1990-01-01",
        "address": {
            "street": "123 Main St",
            "city": "Anytown",
            "postalCode": "12345",
            "country": "USA"
        }
    }) {
        p.profile = profile;
    }
    p.tags = vec!["tester".to_string(), "sample".to_string()];
    if let serde_json::Value::Object(prefs) = json!({ "theme": "light", "notifications": true }) {
        p.preferences = prefs;
    }
    p
}
