//! Log setup for the CLI. Library code only emits `tracing` events; whoever
//! embeds the crate decides where they go.

use tracing_subscriber::EnvFilter;

/// Installs a fmt subscriber on stderr. `RUST_LOG` wins over `level`; with
/// neither set, `info` is used. Returns `false` if a subscriber already exists.
pub fn init_logging(level: Option<&str>) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level.unwrap_or("info")))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .try_init()
        .is_ok()
}
