//! Tracing subscriber bootstrap for binaries and tests embedding the graph builder.

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Installs a formatted subscriber filtered by `RUST_LOG` plus a `default_level` directive.
///
/// Returns `false` when a global subscriber was already installed.
pub fn init_tracing(default_level: Level) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(default_level.into()))
        .with_target(true)
        .try_init()
        .is_ok()
}
