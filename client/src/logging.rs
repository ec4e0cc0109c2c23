use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_ENV: &str = "APKSHELF_LOG";

/// Logs go to stderr so command output on stdout stays clean.
pub fn init_logging() -> Result<(), failure::Error> {
    let env = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let base = fmt::layer()
        .with_target(false)
        .with_timer(fmt::time::uptime())
        .with_writer(std::io::stderr);
    tracing_subscriber::registry()
        .with(env)
        .with(base.compact())
        .try_init()
        .map_err(|err| format_err!("unable to set up logging: {}", err))
}
