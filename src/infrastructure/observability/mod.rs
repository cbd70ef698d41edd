use crate::config::Config;
use opentelemetry::{global, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{runtime, trace as sdktrace, Resource};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

const DEFAULT_FILTER: &str = "helpdesk=debug,tower_http=debug,sqlx=warn";

/// Flushes pending spans when dropped. Hold it for the life of the process.
pub struct ObservabilityGuard {
    otel_enabled: bool,
}

impl Drop for ObservabilityGuard {
    fn drop(&mut self) {
        if self.otel_enabled {
            global::shutdown_tracer_provider();
        }
    }
}

pub fn init(config: &Config) -> Result<ObservabilityGuard, Box<dyn std::error::Error>> {
    let otel_enabled = init_tracing(config)?;
    if let Some(port) = config.metrics_port {
        init_metrics(port)?;
    }
    Ok(ObservabilityGuard { otel_enabled })
}

fn otlp_tracer(config: &Config) -> Result<Option<sdktrace::Tracer>, Box<dyn std::error::Error>> {
    let Some(endpoint) = &config.otel_exporter_endpoint else {
        return Ok(None);
    };

    let exporter = opentelemetry_otlp::new_exporter()
        .tonic()
        .with_endpoint(endpoint);

    let tracer = opentelemetry_otlp::new_pipeline()
        .tracing()
        .with_exporter(exporter)
        .with_trace_config(sdktrace::config().with_resource(Resource::new(vec![
            KeyValue::new("service.name", config.service_name.clone()),
        ])))
        .install_batch(runtime::Tokio)?;

    Ok(Some(tracer))
}

/// Stdout formatting plus an optional OTLP exporter. Returns whether OTLP is on.
fn init_tracing(config: &Config) -> Result<bool, Box<dyn std::error::Error>> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = tracing_subscriber::fmt::layer().with_target(true);

    let otel_layer = otlp_tracer(config)?
        .map(|tracer| tracing_opentelemetry::layer().with_tracer(tracer));
    let otel_enabled = otel_layer.is_some();

    Registry::default()
        .with(env_filter)
        .with(fmt_layer)
        .with(otel_layer)
        .try_init()?;

    Ok(otel_enabled)
}

fn init_metrics(port: u16) -> Result<(), Box<dyn std::error::Error>> {
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], port))
        .install()?;

    tracing::info!("Metrics exporter (Prometheus) started on port {}", port);
    Ok(())
}
