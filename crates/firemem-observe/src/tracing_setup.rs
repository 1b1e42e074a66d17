//! Tracing subscriber initialization with structured logging and optional
//! OpenTelemetry trace export.
//!
//! # Usage
//!
//! ```no_run
//! // Basic structured logging only
//! firemem_observe::tracing_setup::init_tracing(false).unwrap();
//!
//! // A dispatcher for one store, independent of the global subscriber
//! let dispatch = firemem_observe::tracing_setup::scoped_dispatch(
//!     "firemem=debug",
//!     firemem_observe::LogFormat::Json,
//! )
//! .unwrap();
//! ```

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing::Dispatch;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use std::sync::OnceLock;

/// Stores the OTel tracer provider so it can be shut down cleanly on exit.
static TRACER_PROVIDER: OnceLock<SdkTracerProvider> = OnceLock::new();

/// Output format for a scoped dispatcher.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Initialize the global tracing subscriber.
///
/// - Always installs a structured `fmt` layer with target visibility and span
///   close timing.
/// - When `enable_otel` is true, additionally bridges tracing spans to
///   OpenTelemetry using a stdout exporter.
/// - Respects `RUST_LOG` via `EnvFilter::from_default_env()`.
///
/// # Errors
///
/// Returns an error if the global subscriber has already been set.
pub fn init_tracing(enable_otel: bool) -> Result<(), Box<dyn std::error::Error>> {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE);

    let env_filter = EnvFilter::from_default_env();

    if enable_otel {
        let provider = SdkTracerProvider::builder()
            .with_simple_exporter(opentelemetry_stdout::SpanExporter::default())
            .build();
        let tracer = provider.tracer("firemem");
        let otel_layer = tracing_opentelemetry::layer().with_tracer(tracer);

        let _ = TRACER_PROVIDER.set(provider.clone());
        opentelemetry::global::set_tracer_provider(provider);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .with(otel_layer)
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;
    }

    Ok(())
}

/// Build a standalone dispatcher filtered by `filter` (`RUST_LOG` syntax).
///
/// The result is not installed anywhere; hand it to a store's logger so that
/// store logs with its own verbosity.
pub fn scoped_dispatch(filter: &str, format: LogFormat) -> Result<Dispatch, ParseError> {
    scoped_dispatch_to(filter, format, std::io::stdout)
}

/// Like [`scoped_dispatch`], but writes formatted events to `writer`.
pub fn scoped_dispatch_to<W>(
    filter: &str,
    format: LogFormat,
    writer: W,
) -> Result<Dispatch, ParseError>
where
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    let env_filter = EnvFilter::try_new(filter)?;
    let builder = tracing_subscriber::fmt()
        .with_target(true)
        .with_env_filter(env_filter)
        .with_writer(writer);

    let dispatch = match format {
        LogFormat::Pretty => Dispatch::new(builder.finish()),
        LogFormat::Json => Dispatch::new(builder.json().finish()),
    };
    Ok(dispatch)
}

/// Flush pending traces and shut down the OpenTelemetry tracer provider.
///
/// Safe to call even when OTel was not enabled.
pub fn shutdown_tracing() {
    if let Some(provider) = TRACER_PROVIDER.get() {
        if let Err(e) = provider.shutdown() {
            eprintln!("Warning: OTel tracer provider shutdown error: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};

    use super::*;
    use tracing::Level;

    #[test]
    fn test_scoped_dispatch_honours_filter() {
        let dispatch = scoped_dispatch("warn", LogFormat::Pretty).unwrap();
        tracing::dispatcher::with_default(&dispatch, || {
            assert!(tracing::enabled!(Level::WARN));
            assert!(!tracing::enabled!(Level::DEBUG));
        });
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_scoped_dispatch_json() {
        let captured = Captured::default();
        let writer = captured.clone();
        let dispatch =
            scoped_dispatch_to("firemem=debug", LogFormat::Json, move || writer.clone()).unwrap();
        tracing::dispatcher::with_default(&dispatch, || {
            tracing::debug!(target: "firemem", key = "k", "Storing data");
            tracing::trace!(target: "firemem", key = "hidden", "Filtered out");
        });

        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 1);
        let event: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(event["level"], "DEBUG");
        assert_eq!(event["target"], "firemem");
        assert_eq!(event["fields"]["key"], "k");
        assert_eq!(event["fields"]["message"], "Storing data");
    }

    #[test]
    fn test_init_tracing_twice_is_error() {
        init_tracing(false).unwrap();
        let err = init_tracing(false).unwrap_err();
        assert!(err.to_string().contains("already been set"));
    }

    #[test]
    fn test_scoped_dispatch_rejects_bad_filter() {
        assert!(scoped_dispatch("firemem=notalevel", LogFormat::Pretty).is_err());
    }

    #[test]
    fn test_shutdown_without_init_is_noop() {
        shutdown_tracing();
    }
}
