//! Settings-file loader for firemem.
//!
//! Reads a `firemem.toml` and turns it into the builder and client options
//! needed to open a [`FirestoreMemory`]. Unlike the host's own config, a
//! missing or malformed file is an error: the project id has no default.

use std::path::Path;

use firemem_core::config::{Logger, MemoryConfigBuilder};
use firemem_types::config::FirestoreSettings;
use firemem_types::error::{ConfigError, MemoryError};

use crate::firestore::client::ClientOptions;
use crate::firestore::memory::FirestoreMemory;

/// Load settings from `path`.
pub async fn load_settings(path: &Path) -> Result<FirestoreSettings, ConfigError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ConfigError::Io(format!("{}: {e}", path.display())))?;

    let settings: FirestoreSettings = toml::from_str(&content)
        .map_err(|e| ConfigError::Parse(format!("{}: {e}", path.display())))?;

    tracing::debug!(
        path = %path.display(),
        project = %settings.project,
        "Loaded Firestore settings"
    );
    Ok(settings)
}

/// A config builder seeded from `settings`.
pub fn memory_config_builder(settings: &FirestoreSettings) -> MemoryConfigBuilder {
    let builder = MemoryConfigBuilder::new(settings.project.clone());
    match &settings.collection {
        Some(collection) => builder.collection(collection.clone()),
        None => builder,
    }
}

/// Load `path` and connect, logging through `logger`.
pub async fn connect_from_settings(
    path: &Path,
    logger: Logger,
) -> Result<FirestoreMemory, MemoryError> {
    let settings = load_settings(path).await?;
    let config = memory_config_builder(&settings).logger(logger).build()?;
    FirestoreMemory::connect_with(config, ClientOptions::from(&settings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_settings_missing_file_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let err = load_settings(&tmp.path().join("firemem.toml")).await.unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[tokio::test]
    async fn load_settings_invalid_toml_is_parse_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("firemem.toml");
        tokio::fs::write(&path, "this is not { valid toml !!!")
            .await
            .unwrap();

        let err = load_settings(&path).await.unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[tokio::test]
    async fn load_settings_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("firemem.toml");
        tokio::fs::write(&path, "project = \"p\"\ncollection = \"bot-test\"\n")
            .await
            .unwrap();

        let settings = load_settings(&path).await.unwrap();
        let config = memory_config_builder(&settings).build().unwrap();
        assert_eq!(config.project(), "p");
        assert_eq!(config.collection(), "bot-test");
    }

    #[tokio::test]
    async fn connect_from_settings_with_emulator_host() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("firemem.toml");
        tokio::fs::write(
            &path,
            "project = \"p\"\nemulator_host = \"localhost:8080\"\n",
        )
        .await
        .unwrap();

        let memory = connect_from_settings(&path, Logger::noop()).await.unwrap();
        assert_eq!(memory.project(), "p");
        assert_eq!(memory.collection(), "joe-bot");
    }

    #[tokio::test]
    async fn connect_from_settings_rejects_bad_collection() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("firemem.toml");
        tokio::fs::write(&path, "project = \"p\"\ncollection = \"a/b\"\n")
            .await
            .unwrap();

        let err = connect_from_settings(&path, Logger::noop())
            .await
            .err()
            .unwrap();
        assert!(matches!(
            err,
            MemoryError::Config(ConfigError::InvalidCollection(_))
        ));
    }
}
