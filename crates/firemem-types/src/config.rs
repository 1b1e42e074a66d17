//! Settings-file types for firemem.
//!
//! `FirestoreSettings` mirrors `firemem.toml`. Only `project` is required;
//! everything else falls back to the client defaults.

use serde::{Deserialize, Serialize};

/// Default per-request timeout for the Firestore client, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default number of documents fetched per listing page.
pub const DEFAULT_PAGE_SIZE: u32 = 300;

/// Contents of a `firemem.toml` settings file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirestoreSettings {
    /// Google Cloud project that owns the database.
    pub project: String,

    /// Collection holding one document per key. Empty means the default.
    #[serde(default)]
    pub collection: Option<String>,

    /// Database id within the project.
    #[serde(default = "default_database")]
    pub database: String,

    /// Override for the REST endpoint (e.g. a proxy).
    #[serde(default)]
    pub endpoint: Option<String>,

    /// `host:port` of a local Firestore emulator.
    #[serde(default)]
    pub emulator_host: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_database() -> String {
    "(default)".to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_deserialize_with_defaults() {
        let settings: FirestoreSettings = toml::from_str(r#"project = "p""#).unwrap();
        assert_eq!(settings.project, "p");
        assert_eq!(settings.collection, None);
        assert_eq!(settings.database, "(default)");
        assert_eq!(settings.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(settings.page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_settings_deserialize_with_values() {
        let toml_str = r#"
project = "bots-prod"
collection = "bot-test"
emulator_host = "localhost:8080"
timeout_secs = 5
page_size = 50
"#;
        let settings: FirestoreSettings = toml::from_str(toml_str).unwrap();
        assert_eq!(settings.collection.as_deref(), Some("bot-test"));
        assert_eq!(settings.emulator_host.as_deref(), Some("localhost:8080"));
        assert_eq!(settings.timeout_secs, 5);
        assert_eq!(settings.page_size, 50);
    }

    #[test]
    fn test_settings_require_project() {
        let result: Result<FirestoreSettings, _> = toml::from_str(r#"collection = "c""#);
        assert!(result.is_err());
    }
}
