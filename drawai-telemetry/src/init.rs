//! Subscriber installation

use std::sync::Once;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

static INIT: Once = Once::new();

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install a human-readable console subscriber.
///
/// `RUST_LOG` overrides the default `info` level. Calling this more than once,
/// or after [`init_json_telemetry`], has no effect.
///
/// # Example
/// ```
/// use drawai_telemetry::init_telemetry;
/// init_telemetry("drawai").expect("telemetry");
/// ```
pub fn init_telemetry(service_name: &str) -> Result<(), Box<dyn std::error::Error>> {
    INIT.call_once(|| {
        let installed = tracing_subscriber::registry()
            .with(env_filter())
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_line_number(true)
                    .with_writer(std::io::stderr),
            )
            .try_init();

        if installed.is_ok() {
            tracing::info!(service.name = service_name, "Telemetry initialized");
        }
    });

    Ok(())
}

/// Install a subscriber that writes one JSON object per event.
pub fn init_json_telemetry(service_name: &str) -> Result<(), Box<dyn std::error::Error>> {
    INIT.call_once(|| {
        let installed = tracing_subscriber::registry()
            .with(env_filter())
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_writer(std::io::stderr),
            )
            .try_init();

        if installed.is_ok() {
            tracing::info!(service.name = service_name, "JSON telemetry initialized");
        }
    });

    Ok(())
}
