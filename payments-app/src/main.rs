//! # Payments Application
//!
//! Binary that wires together all the components:
//! - Load configuration from environment
//! - Initialize the store and provider adapters
//! - Create the payment and reconciliation services
//! - Start the HTTP server

mod config;

use opentelemetry::global;
use opentelemetry_sdk::{
    metrics::SdkMeterProvider, propagation::TraceContextPropagator, trace as sdktrace,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use payments_hex::{PaymentService, ReconciliationService, ServiceSettings, inbound::HttpServer};
use payments_provider::HttpPaymentProvider;
use payments_store::{Seed, build_store};

use config::{Config, LogFormat};

/// OTLP exporters, installed only when an endpoint is configured.
struct Telemetry {
    tracer_provider: sdktrace::SdkTracerProvider,
    meter_provider: SdkMeterProvider,
}

impl Telemetry {
    fn init() -> anyhow::Result<(sdktrace::Tracer, Self)> {
        global::set_text_map_propagator(TraceContextPropagator::new());

        // gRPC exporters with batch processing (non-blocking)
        let span_exporter = opentelemetry_otlp::SpanExporter::builder()
            .with_tonic()
            .build()?;
        let tracer_provider = sdktrace::SdkTracerProvider::builder()
            .with_batch_exporter(span_exporter)
            .build();
        global::set_tracer_provider(tracer_provider.clone());

        let metric_exporter = opentelemetry_otlp::MetricExporter::builder()
            .with_tonic()
            .build()?;
        let meter_provider = SdkMeterProvider::builder()
            .with_periodic_exporter(metric_exporter)
            .build();
        global::set_meter_provider(meter_provider.clone());

        use opentelemetry::trace::TracerProvider as _;
        let tracer = tracer_provider.tracer("payments-service");
        Ok((
            tracer,
            Self {
                tracer_provider,
                meter_provider,
            },
        ))
    }

    fn shutdown(self) {
        let _ = self.tracer_provider.shutdown();
        let _ = self.meter_provider.shutdown();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    let (otel_tracer, telemetry) = if std::env::var_os("OTEL_EXPORTER_OTLP_ENDPOINT").is_some() {
        let (tracer, telemetry) = Telemetry::init()?;
        (Some(tracer), Some(telemetry))
    } else {
        (None, None)
    };
    let otel_layer = otel_tracer.map(|tracer| tracing_opentelemetry::layer().with_tracer(tracer));

    let json = config.log_format == LogFormat::Json;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,payments_app=debug,payments_hex=debug".into()),
        )
        .with((!json).then(tracing_subscriber::fmt::layer))
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with(otel_layer)
        .init();

    tracing::info!(
        port = config.port,
        status_policy = %config.status_policy,
        otlp = telemetry.is_some(),
        "Starting payments server"
    );
    tracing::info!("Using store: {}", config.database_url);
    tracing::info!("Using payment provider: {}", config.provider_base_url);

    // Build store (handles connection and migration)
    let store = build_store(&config.database_url).await?;
    if let Some(path) = &config.seed_file {
        let seed = Seed::from_path(path)?;
        store.seed(&seed).await?;
    }

    let provider = HttpPaymentProvider::new(&config.provider_base_url);

    let settings = ServiceSettings {
        status_policy: config.status_policy,
    };
    let payments = PaymentService::new(store.clone(), provider.clone(), settings);
    let reconciliation = ReconciliationService::new(store, provider);

    // Create and run the HTTP server
    let server = HttpServer::new(payments, reconciliation);
    let addr = format!("0.0.0.0:{}", config.port);

    server.run(&addr).await?;

    // Ensure traces and metrics are flushed before exit
    if let Some(telemetry) = telemetry {
        telemetry.shutdown();
    }
    Ok(())
}
