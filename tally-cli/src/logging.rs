use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "TALLY_LOG";

/// Install the stderr subscriber. `TALLY_LOG` wins over the configured level;
/// `verbose` replaces the configured level with `debug`.
pub fn init_logging(config_level: &str, verbose: bool) {
    let fallback = if verbose { "debug" } else { config_level };
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(fallback))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    // a second init (tests, embedding) keeps the first subscriber
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .ok();
}
