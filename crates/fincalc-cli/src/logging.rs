use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "warn";

/// Install the stderr subscriber. Call once at startup.
///
/// `--log-level` wins over `RUST_LOG`; with neither, only warnings are shown
/// so stdout stays clean for piping.
pub fn init(level: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let filter = match level {
        Some(directive) => EnvFilter::try_new(directive)
            .map_err(|e| format!("invalid log level '{directive}': {e}"))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
    };

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(atty::is(atty::Stream::Stderr))
        .with_target(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .try_init()
        .map_err(|e| format!("logging already initialised: {e}"))?;
    Ok(())
}
