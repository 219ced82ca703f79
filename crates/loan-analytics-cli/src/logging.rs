use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install a stderr subscriber. `RUST_LOG` wins over `--verbose`; without
/// either only warnings are shown so stdout stays machine-readable.
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_line_number(true)
                .with_ansi(atty::is(atty::Stream::Stderr)),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();
}
