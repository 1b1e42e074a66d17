//! Adapter configuration: project, collection and logger.
//!
//! Options are applied in order through [`MemoryConfigBuilder`]; the first
//! invalid option stops the chain. [`MemoryConfigBuilder::build`] fills in
//! defaults (no-op logger, [`DEFAULT_COLLECTION`]) and returns an immutable
//! [`MemoryConfig`].

use std::fmt;
use std::future::Future;

use firemem_types::error::ConfigError;
use firemem_types::memory::{DEFAULT_COLLECTION, is_valid_id};
use tracing::instrument::{Instrumented, WithDispatch, WithSubscriber};
use tracing::{Dispatch, Instrument};

/// Component name used when a logger has not been named.
const DEFAULT_COMPONENT: &str = "memory";

/// Log sink handed to a memory backend.
///
/// Wraps a [`tracing::Dispatch`] so a backend can log to a subscriber other
/// than the process-global one, or to nothing at all.
#[derive(Clone)]
pub struct Logger {
    dispatch: Dispatch,
    component: String,
}

impl Logger {
    /// A logger that discards every event and span.
    pub fn noop() -> Self {
        Self::from_dispatch(Dispatch::none())
    }

    /// A logger bound to the caller's current default subscriber.
    pub fn current() -> Self {
        Self::from_dispatch(tracing::dispatcher::get_default(|dispatch| dispatch.clone()))
    }

    pub fn from_dispatch(dispatch: Dispatch) -> Self {
        Self {
            dispatch,
            component: DEFAULT_COMPONENT.to_string(),
        }
    }

    /// Tag everything logged through this logger with `component`.
    pub fn named(mut self, component: impl Into<String>) -> Self {
        self.component = component.into();
        self
    }

    pub fn component(&self) -> &str {
        &self.component
    }

    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }

    /// Run `f` with this logger as the default subscriber.
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }

    /// Wrap `fut` in a span named after `op`, logging to this logger.
    pub fn instrument<F: Future>(&self, op: &'static str, fut: F) -> WithDispatch<Instrumented<F>> {
        let span = self.in_scope(|| {
            tracing::debug_span!("memory_op", component = %self.component, op = op)
        });
        fut.instrument(span).with_subscriber(self.dispatch.clone())
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("component", &self.component)
            .finish_non_exhaustive()
    }
}

/// A single configuration step applied to a [`MemoryConfigBuilder`].
#[derive(Debug, Clone)]
pub enum MemoryOption {
    /// Replace the log sink.
    Logger(Logger),
    /// Replace the target collection. An empty name means "use the default".
    Collection(String),
}

impl MemoryOption {
    /// Apply this option to `builder`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidCollection`] for a non-empty collection
    /// name that cannot name a collection.
    pub fn apply(self, builder: &mut MemoryConfigBuilder) -> Result<(), ConfigError> {
        match self {
            Self::Logger(logger) => {
                builder.logger = Some(logger);
            }
            Self::Collection(name) => {
                validate_collection(&name)?;
                builder.collection = Some(name);
            }
        }
        Ok(())
    }
}

/// Resolved, immutable adapter configuration.
#[derive(Debug, Clone)]
pub struct MemoryConfig {
    project: String,
    collection: String,
    logger: Logger,
}

impl MemoryConfig {
    pub fn builder(project: impl Into<String>) -> MemoryConfigBuilder {
        MemoryConfigBuilder::new(project)
    }

    /// Build a config from `project` and `options` applied in order.
    pub fn from_options(
        project: impl Into<String>,
        options: impl IntoIterator<Item = MemoryOption>,
    ) -> Result<Self, ConfigError> {
        MemoryConfigBuilder::new(project).options(options)?.build()
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }
}

/// Accumulates configuration before the adapter is constructed.
#[derive(Debug, Clone, Default)]
pub struct MemoryConfigBuilder {
    project: String,
    collection: Option<String>,
    logger: Option<Logger>,
}

impl MemoryConfigBuilder {
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            ..Self::default()
        }
    }

    pub fn logger(mut self, logger: Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Set the collection name. Validation happens in [`Self::build`].
    pub fn collection(mut self, name: impl Into<String>) -> Self {
        self.collection = Some(name.into());
        self
    }

    pub fn option(mut self, option: MemoryOption) -> Result<Self, ConfigError> {
        option.apply(&mut self)?;
        Ok(self)
    }

    /// Apply `options` in order, stopping at the first failure.
    pub fn options(
        mut self,
        options: impl IntoIterator<Item = MemoryOption>,
    ) -> Result<Self, ConfigError> {
        for option in options {
            option.apply(&mut self)?;
        }
        Ok(self)
    }

    /// Whether a logger has been set explicitly.
    pub fn has_logger(&self) -> bool {
        self.logger.is_some()
    }

    /// Resolve defaults and validate.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::MissingProject`] if the project is blank.
    /// - [`ConfigError::InvalidCollection`] if the collection name is invalid.
    pub fn build(self) -> Result<MemoryConfig, ConfigError> {
        let project = self.project.trim().to_string();
        if project.is_empty() {
            return Err(ConfigError::MissingProject);
        }

        let collection = match self.collection {
            Some(name) if !name.is_empty() => {
                validate_collection(&name)?;
                name
            }
            _ => DEFAULT_COLLECTION.to_string(),
        };

        Ok(MemoryConfig {
            project,
            collection,
            logger: self.logger.unwrap_or_else(Logger::noop),
        })
    }
}

fn validate_collection(name: &str) -> Result<(), ConfigError> {
    if name.is_empty() || is_valid_id(name) {
        Ok(())
    } else {
        Err(ConfigError::InvalidCollection(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_applies_defaults() {
        let config = MemoryConfig::builder("p").build().unwrap();
        assert_eq!(config.project(), "p");
        assert_eq!(config.collection(), DEFAULT_COLLECTION);
        assert_eq!(config.logger().component(), DEFAULT_COMPONENT);
    }

    #[test]
    fn test_build_requires_project() {
        let err = MemoryConfig::builder("  ").build().unwrap_err();
        assert!(matches!(err, ConfigError::MissingProject));
    }

    #[test]
    fn test_options_apply_in_order() {
        let config = MemoryConfig::from_options(
            "p",
            [
                MemoryOption::Collection("first".to_string()),
                MemoryOption::Collection("bot-test".to_string()),
                MemoryOption::Logger(Logger::noop().named("firestore")),
            ],
        )
        .unwrap();
        assert_eq!(config.collection(), "bot-test");
        assert_eq!(config.logger().component(), "firestore");
    }

    #[test]
    fn test_empty_collection_option_falls_back_to_default() {
        let config =
            MemoryConfig::from_options("p", [MemoryOption::Collection(String::new())]).unwrap();
        assert_eq!(config.collection(), DEFAULT_COLLECTION);
    }

    #[test]
    fn test_invalid_option_short_circuits() {
        let builder = MemoryConfigBuilder::new("p");
        let err = builder
            .options([
                MemoryOption::Collection("bad/name".to_string()),
                MemoryOption::Logger(Logger::noop()),
            ])
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidCollection(name) if name == "bad/name"));
    }

    #[test]
    fn test_setter_collection_validated_on_build() {
        let err = MemoryConfig::builder("p")
            .collection("__reserved__")
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidCollection(_)));
    }

    #[test]
    fn test_has_logger() {
        let builder = MemoryConfigBuilder::new("p");
        assert!(!builder.has_logger());
        let builder = builder.option(MemoryOption::Logger(Logger::current())).unwrap();
        assert!(builder.has_logger());
    }

    #[tokio::test]
    async fn test_instrument_runs_future_under_noop_logger() {
        let logger = Logger::noop();
        let value = Logger::instrument(&logger, "get", async {
            tracing::info!("not recorded anywhere");
            42
        })
        .await;
        assert_eq!(value, 42);
    }
}
