use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::core::config::Settings;

/// Installs the global subscriber. Output goes to stderr so command output on stdout
/// stays clean; `RUST_LOG` overrides the configured level.
pub fn init_tracing(settings: &Settings) -> anyhow::Result<()> {
    let telemetry = settings.telemetry();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&telemetry.log_level));
    fn output<S>() -> fmt::Layer<S, fmt::format::DefaultFields, fmt::format::Format, fn() -> std::io::Stderr> {
        fmt::layer().with_target(false).with_writer(std::io::stderr)
    }

    tracing_subscriber::registry()
        .with(filter)
        .with(telemetry.json.then(|| output().json()))
        .with((!telemetry.json).then(output))
        .try_init()
        .map_err(|err| anyhow::anyhow!("tracing already initialised: {err}"))
}
