use crate::error::{Result, SqlGenError};
use opentelemetry::{trace::TracerProvider as _, KeyValue};
use opentelemetry_sdk::trace::SdkTracerProvider;
use opentelemetry_sdk::Resource;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const ENABLE_VAR: &str = "SQLGEN_ENABLE_TRACING";
const ENDPOINT_VAR: &str = "OTEL_EXPORTER_OTLP_ENDPOINT";

/// where spans are exported, if anywhere
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SpanExport {
    pub endpoint: String,
}

impl SpanExport {
    /// export needs both the opt-in flag and a non-empty collector endpoint
    pub(crate) fn from_lookup<F>(lookup: F) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let opted_in = lookup(ENABLE_VAR)
            .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);
        if !opted_in {
            return None;
        }
        lookup(ENDPOINT_VAR)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(|endpoint| Self { endpoint })
    }

    fn build_provider(&self, service_name: &str) -> Result<SdkTracerProvider> {
        use opentelemetry_otlp::WithExportConfig;

        let exporter = opentelemetry_otlp::SpanExporter::builder()
            .with_tonic()
            .with_endpoint(&self.endpoint)
            .build()
            .map_err(|e| SqlGenError::Tracing(format!("exporter build failed: {}", e)))?;

        let resource = Resource::builder_empty()
            .with_attribute(KeyValue::new("service.name", service_name.to_string()))
            .build();

        Ok(SdkTracerProvider::builder()
            .with_batch_exporter(exporter)
            .with_resource(resource)
            .build())
    }
}

/// keeps the span exporter alive; pending spans are flushed on drop
pub struct OtelGuard {
    tracer_provider: Option<SdkTracerProvider>,
}

impl OtelGuard {
    pub fn is_exporting(&self) -> bool {
        self.tracer_provider.is_some()
    }
}

impl Drop for OtelGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.tracer_provider.take() {
            if let Err(e) = provider.shutdown() {
                eprintln!("error shutting down tracer provider: {}", e);
            }
        }
    }
}

/// install the global subscriber
///
/// logs go to stderr so they never interleave with interactive prompts.
/// `default_level` applies when `RUST_LOG` is unset. spans are also sent to
/// an otlp collector when `SQLGEN_ENABLE_TRACING` is set and
/// `OTEL_EXPORTER_OTLP_ENDPOINT` names one.
pub fn init_tracing(service_name: &str, default_level: &str) -> Result<OtelGuard> {
    let export = SpanExport::from_lookup(|name| std::env::var(name).ok());
    let provider = export
        .as_ref()
        .map(|export| export.build_provider(service_name))
        .transpose()?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into());
    let telemetry = provider
        .as_ref()
        .map(|p| tracing_opentelemetry::layer().with_tracer(p.tracer(service_name.to_string())));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(telemetry)
        .try_init()
        .map_err(|e| SqlGenError::Tracing(e.to_string()))?;

    match &export {
        Some(export) => tracing::info!(service = service_name, endpoint = %export.endpoint, "span export enabled"),
        None => tracing::debug!(service = service_name, "logging to stderr only"),
    }

    Ok(OtelGuard {
        tracer_provider: provider,
    })
}
