//! Observability setup for firemem: the process-wide subscriber and scoped
//! dispatchers handed to individual stores.

pub mod tracing_setup;

pub use tracing_setup::{
    LogFormat, init_tracing, scoped_dispatch, scoped_dispatch_to, shutdown_tracing,
};
