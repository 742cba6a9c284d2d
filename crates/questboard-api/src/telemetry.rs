//! Tracing subscriber and OpenTelemetry span export.
//!
//! Logs always go to stdout as JSON. When an OTLP endpoint is configured,
//! spans are also shipped to the collector over gRPC.

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing::warn;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::AppConfig;
use crate::error::AppError;

/// Service name reported to the collector.
pub const SERVICE_NAME: &str = "questboard-api";

/// Keeps the span exporter alive; call [`TelemetryGuard::shutdown`] before
/// exit to flush buffered spans.
#[derive(Debug)]
pub struct TelemetryGuard {
    provider: Option<SdkTracerProvider>,
}

impl TelemetryGuard {
    /// Whether spans are being exported.
    #[must_use]
    pub fn is_exporting(&self) -> bool {
        self.provider.is_some()
    }

    /// Flushes and stops the span exporter.
    pub fn shutdown(self) {
        let Some(provider) = self.provider else {
            return;
        };
        if let Err(e) = provider.shutdown() {
            warn!(error = %e, "span exporter did not shut down cleanly");
        }
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Installs the global tracing subscriber.
///
/// # Errors
///
/// Returns `AppError::Telemetry` if the exporter cannot be built or a
/// global subscriber is already set.
pub fn init(config: &AppConfig) -> Result<TelemetryGuard, AppError> {
    let fmt_layer = tracing_subscriber::fmt::layer().json();

    let Some(endpoint) = config.otlp_endpoint.as_deref() else {
        tracing_subscriber::registry()
            .with(env_filter())
            .with(fmt_layer)
            .try_init()
            .map_err(|e| AppError::Telemetry(e.to_string()))?;
        return Ok(TelemetryGuard { provider: None });
    };

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()
        .map_err(|e| AppError::Telemetry(format!("OTLP exporter: {e}")))?;

    let provider = SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(Resource::builder().with_service_name(SERVICE_NAME).build())
        .build();
    let tracer = provider.tracer(SERVICE_NAME);

    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt_layer)
        .with(tracing_opentelemetry::layer().with_tracer(tracer))
        .try_init()
        .map_err(|e| AppError::Telemetry(e.to_string()))?;
    opentelemetry::global::set_tracer_provider(provider.clone());

    Ok(TelemetryGuard {
        provider: Some(provider),
    })
}
