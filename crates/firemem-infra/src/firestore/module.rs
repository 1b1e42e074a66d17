//! Plugin-style constructor for the host framework.
//!
//! `firestore_module(project, options)` returns a [`Module`] that resolves the
//! configuration, connects, and registers the store with the host. When no
//! logger option is given the store logs through the host's `"firestore"`
//! logger rather than the silent default of the direct constructor.

use firemem_core::config::{MemoryConfigBuilder, MemoryOption};
use firemem_core::host::{HostConfig, Module};
use firemem_types::error::MemoryError;

use super::client::ClientOptions;
use super::memory::FirestoreMemory;

/// Logger name requested from the host.
const LOGGER_NAME: &str = "firestore";

/// Module that registers a [`FirestoreMemory`] with the host.
pub struct FirestoreModule {
    project: String,
    options: Vec<MemoryOption>,
    client_options: Option<ClientOptions>,
}

/// Build a module for `project` with `options` applied in order.
pub fn firestore_module(
    project: impl Into<String>,
    options: impl IntoIterator<Item = MemoryOption>,
) -> FirestoreModule {
    FirestoreModule {
        project: project.into(),
        options: options.into_iter().collect(),
        client_options: None,
    }
}

impl FirestoreModule {
    /// Use explicit client options instead of [`ClientOptions::from_env`].
    pub fn with_client_options(mut self, client_options: ClientOptions) -> Self {
        self.client_options = Some(client_options);
        self
    }
}

impl Module for FirestoreModule {
    async fn init(self, conf: &mut HostConfig) -> Result<(), MemoryError> {
        let mut builder = MemoryConfigBuilder::new(self.project).options(self.options)?;
        if !builder.has_logger() {
            builder = builder.logger(conf.logger(LOGGER_NAME));
        }
        let config = builder.build()?;

        let client_options = self.client_options.unwrap_or_else(ClientOptions::from_env);
        let memory = FirestoreMemory::connect_with(config, client_options)?;
        conf.set_memory(memory);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::firestore::client::Credentials;
    use firemem_core::context::CallContext;
    use firemem_core::memory::store::Memory;
    use firemem_types::error::ConfigError;
    use tracing::Dispatch;

    fn emulator_options(server: &mockito::ServerGuard) -> ClientOptions {
        ClientOptions::default()
            .with_endpoint(format!("{}/v1", server.url()))
            .with_credentials(Credentials::Emulator)
    }

    #[tokio::test]
    async fn test_module_registers_store_with_host() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock(
                "GET",
                "/v1/projects/p/databases/(default)/documents/bot-test/greeting",
            )
            .with_status(200)
            .with_body(r#"{"fields": {"value": {"bytesValue": "aGk="}}}"#)
            .create_async()
            .await;

        let mut conf = HostConfig::new(Dispatch::none());
        let module = firestore_module("p", [MemoryOption::Collection("bot-test".to_string())])
            .with_client_options(emulator_options(&server));
        conf.load(module).await.unwrap();

        let memory = conf.take_memory().expect("firestore memory registered");
        let got = memory.get(&CallContext::new(), "greeting").await.unwrap();
        assert_eq!(got, Some(b"hi".to_vec()));
    }

    #[tokio::test]
    async fn test_invalid_option_stops_registration() {
        let mut conf = HostConfig::new(Dispatch::none());
        let module = firestore_module(
            "p",
            [
                MemoryOption::Collection("bad/collection".to_string()),
                MemoryOption::Collection("bot-test".to_string()),
            ],
        )
        .with_client_options(ClientOptions::default().with_credentials(Credentials::Emulator));

        let err = conf.load(module).await.unwrap_err();
        assert!(matches!(err, MemoryError::Config(ConfigError::InvalidCollection(_))));
        assert!(conf.memory().is_none());
    }

    #[tokio::test]
    async fn test_connection_failure_propagates() {
        let mut conf = HostConfig::new(Dispatch::none());
        let module = firestore_module("p", Vec::<MemoryOption>::new())
            .with_client_options(ClientOptions::default());

        let err = conf.load(module).await.unwrap_err();
        assert!(matches!(err, MemoryError::Connection(_)));
        assert!(conf.memory().is_none());
    }
}
