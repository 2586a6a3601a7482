//! Subscriber installation.
//!
//! Every `tracing` span and event in the workspace flows through the layers
//! installed here:
//!
//! - an `EnvFilter` built from `RUST_LOG`, or from `logging.level` when the
//!   variable is unset or does not parse;
//! - a `fmt` layer writing JSON or pretty lines to stderr (stdout carries the
//!   reconcile envelopes);
//! - an OpenTelemetry layer exporting spans over OTLP/gRPC, present only when
//!   `telemetry.otlp_endpoint` is configured.

use anyhow::Context;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::trace::TracerProvider;
use opentelemetry_sdk::{runtime, Resource};
use tracing::error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::{HostConfig, LogFormat};

/// Service name reported to the trace collector.
pub const SERVICE_NAME: &str = "reconciler-host";

/// Keeps the trace pipeline alive until [`Telemetry::shutdown`].
#[must_use = "dropping the guard without shutdown loses buffered spans"]
pub struct Telemetry {
    provider: Option<TracerProvider>,
}

impl Telemetry {
    /// Flushes and stops the OTLP exporter, if one was installed.
    pub fn shutdown(self) {
        if let Some(provider) = self.provider {
            if let Err(err) = provider.shutdown() {
                error!(error = %err, "failed to flush trace exporter");
            }
        }
    }
}

/// Builds the filter from the `RUST_LOG` directive when it is set and
/// parses, and from the configured `level` otherwise.
pub fn env_filter(from_env: Option<&str>, level: &str) -> anyhow::Result<EnvFilter> {
    if let Some(filter) = from_env.and_then(|directive| EnvFilter::try_new(directive).ok()) {
        return Ok(filter);
    }
    EnvFilter::try_new(level).with_context(|| format!("invalid log level {level:?}"))
}

/// Installs the global subscriber.
///
/// Must be called from inside a Tokio runtime when an OTLP endpoint is set:
/// the batch exporter spawns onto it.
pub fn init(config: &HostConfig) -> anyhow::Result<Telemetry> {
    let from_env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = env_filter(from_env.as_deref(), &config.logging.level)?;

    let fmt = match config.logging.format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .pretty()
            .with_writer(std::io::stderr)
            .boxed(),
    };

    let provider = config
        .telemetry
        .otlp_endpoint
        .as_deref()
        .map(otlp_provider)
        .transpose()?;
    let otel = provider
        .as_ref()
        .map(|provider| tracing_opentelemetry::layer().with_tracer(provider.tracer(SERVICE_NAME)));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt)
        .with(otel)
        .try_init()
        .context("a global tracing subscriber is already installed")?;

    Ok(Telemetry { provider })
}

fn otlp_provider(endpoint: &str) -> anyhow::Result<TracerProvider> {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()
        .with_context(|| format!("cannot build OTLP exporter for {endpoint}"))?;

    Ok(TracerProvider::builder()
        .with_batch_exporter(exporter, runtime::Tokio)
        .with_resource(Resource::new([KeyValue::new("service.name", SERVICE_NAME)]))
        .build())
}
