//! Host-side registration surface for memory backends.
//!
//! The bot framework owns a [`HostConfig`] during startup and hands it to each
//! [`Module`] in turn. A storage module builds its backend and registers it
//! with [`HostConfig::set_memory`]; the framework then takes the registered
//! backend (or falls back to [`InMemoryStore`]) for the rest of the process.

use std::future::Future;

use firemem_types::error::MemoryError;
use tracing::Dispatch;

use crate::config::Logger;
use crate::memory::box_memory::BoxMemory;
use crate::memory::in_memory::InMemoryStore;
use crate::memory::store::Memory;

/// A pluggable unit initialized against the host configuration.
pub trait Module: Send + Sized {
    /// Initialize the module, registering whatever it provides with `conf`.
    fn init(self, conf: &mut HostConfig) -> impl Future<Output = Result<(), MemoryError>> + Send;
}

/// The host framework's configuration object.
pub struct HostConfig {
    dispatch: Dispatch,
    memory: Option<BoxMemory>,
}

impl HostConfig {
    /// Create a host configuration whose loggers write to `dispatch`.
    pub fn new(dispatch: Dispatch) -> Self {
        Self {
            dispatch,
            memory: None,
        }
    }

    /// A named logger on the host's subscriber.
    pub fn logger(&self, name: &str) -> Logger {
        Logger::from_dispatch(self.dispatch.clone()).named(name)
    }

    /// Register the memory backend. A later registration replaces an earlier one.
    pub fn set_memory<M: Memory + 'static>(&mut self, memory: M) {
        if self.memory.is_some() {
            tracing::dispatcher::with_default(&self.dispatch, || {
                tracing::warn!("Replacing previously registered memory backend");
            });
        }
        self.memory = Some(BoxMemory::new(memory));
    }

    pub fn memory(&self) -> Option<&BoxMemory> {
        self.memory.as_ref()
    }

    pub fn take_memory(&mut self) -> Option<BoxMemory> {
        self.memory.take()
    }

    /// Take the registered backend, or an empty [`InMemoryStore`] if no
    /// module registered one.
    pub fn take_memory_or_default(&mut self) -> BoxMemory {
        self.memory
            .take()
            .unwrap_or_else(|| BoxMemory::new(InMemoryStore::new()))
    }

    /// Initialize `module` against this configuration.
    pub async fn load<M: Module>(&mut self, module: M) -> Result<(), MemoryError> {
        module.init(self).await
    }
}

impl Default for HostConfig {
    fn default() -> Self {
        Self::new(tracing::dispatcher::get_default(|dispatch| dispatch.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CallContext;
    use firemem_types::error::ConfigError;

    struct SeededModule {
        key: &'static str,
    }

    impl Module for SeededModule {
        async fn init(self, conf: &mut HostConfig) -> Result<(), MemoryError> {
            let store = InMemoryStore::new();
            store.set(&CallContext::new(), self.key, b"seed").await?;
            conf.set_memory(store);
            Ok(())
        }
    }

    struct FailingModule;

    impl Module for FailingModule {
        async fn init(self, _conf: &mut HostConfig) -> Result<(), MemoryError> {
            Err(ConfigError::MissingProject.into())
        }
    }

    #[tokio::test]
    async fn test_module_registers_memory() {
        let mut conf = HostConfig::new(Dispatch::none());
        conf.load(SeededModule { key: "seeded" }).await.unwrap();

        let memory = conf.memory().expect("memory registered");
        let got = memory.get(&CallContext::new(), "seeded").await.unwrap();
        assert_eq!(got, Some(b"seed".to_vec()));
    }

    #[tokio::test]
    async fn test_module_error_propagates() {
        let mut conf = HostConfig::new(Dispatch::none());
        let err = conf.load(FailingModule).await.unwrap_err();
        assert!(matches!(err, MemoryError::Config(ConfigError::MissingProject)));
        assert!(conf.memory().is_none());
    }

    #[tokio::test]
    async fn test_take_memory_or_default_falls_back() {
        let mut conf = HostConfig::default();
        let memory = conf.take_memory_or_default();
        assert!(memory.keys(&CallContext::new()).await.unwrap().is_empty());
    }

    #[test]
    fn test_logger_is_named() {
        let conf = HostConfig::new(Dispatch::none());
        assert_eq!(conf.logger("firestore").component(), "firestore");
    }
}
