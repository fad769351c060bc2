use tracing_subscriber::{fmt, EnvFilter};

/// install a global fmt subscriber filtered by `RUST_LOG` (defaults to `info`)
///
/// calling it more than once (or after another subscriber was installed) is a no-op
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_target(true).try_init();
}
