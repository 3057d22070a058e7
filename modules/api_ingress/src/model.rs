use std::collections::BTreeMap;

use serde_json::Value;

#[derive(Debug, Default, Clone)]
pub struct ComponentsRegistry {
    /// Schema name -> JSON schema (serialized to components.schemas)
    pub schemas: BTreeMap<String, Value>,
}

impl ComponentsRegistry {
    /// Register a schema component with conflict detection.
    /// Returns: true if inserted, false if the name was already taken.
    pub fn register_schema(&mut self, name: impl Into<String>, schema: Value) -> bool {
        let name = name.into();
        match self.schemas.get(&name) {
            Some(existing) if *existing == schema => {
                tracing::trace!(schema_name = %name, "Identical schema re-registered, ignoring");
                false
            }
            Some(_) => {
                tracing::error!(
                    schema_name = %name,
                    "Conflicting schema content under the same component key; keeping the first"
                );
                false
            }
            None => {
                self.schemas.insert(name, schema);
                true
            }
        }
    }

    pub fn has_schema(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }
}
