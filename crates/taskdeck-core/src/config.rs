//! Backend connection configuration.
//!
//! The managed backend is addressed by a project id and an API key,
//! both typically injected through the environment at deploy time.

use serde::{Deserialize, Serialize};

/// Connection settings for the managed identity/document backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Project identifier within the managed backend.
    pub project_id: String,
    /// Client API key. Not a secret; scoping is enforced server-side.
    pub api_key: String,
    /// Name of the collection holding task documents.
    #[serde(default = "default_tasks_collection")]
    pub tasks_collection: String,
}

fn default_tasks_collection() -> String {
    "tasks".to_string()
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            project_id: "taskdeck-local".to_string(),
            api_key: String::new(),
            tasks_collection: default_tasks_collection(),
        }
    }
}

impl BackendConfig {
    /// Builds a config from `TASKDECK_*` environment variables,
    /// falling back to defaults for anything unset.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            project_id: std::env::var("TASKDECK_PROJECT_ID").unwrap_or(defaults.project_id),
            api_key: std::env::var("TASKDECK_API_KEY").unwrap_or(defaults.api_key),
            tasks_collection: std::env::var("TASKDECK_TASKS_COLLECTION")
                .unwrap_or(defaults.tasks_collection),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_collection_name() {
        let config = BackendConfig::default();
        assert_eq!(config.tasks_collection, "tasks");
    }

    #[test]
    fn test_deserialize_fills_collection_default() {
        let config: BackendConfig =
            serde_json::from_str(r#"{"project_id":"p","api_key":"k"}"#).unwrap();
        assert_eq!(config.tasks_collection, "tasks");
    }
}
