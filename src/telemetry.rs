use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LOG_DIRECTIVES: &str = "warn";
const VERBOSE_LOG_DIRECTIVES: &str = "warn,park_score=debug";

/// Install the stderr log subscriber. `RUST_LOG` overrides the level picked
/// from `verbose`. Calling this twice is harmless.
pub fn init_logging(verbose: bool) {
    let directives = if verbose {
        VERBOSE_LOG_DIRECTIVES
    } else {
        DEFAULT_LOG_DIRECTIVES
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives));

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .try_init();
}
