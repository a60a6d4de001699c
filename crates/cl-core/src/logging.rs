//! Tracing setup for the bridge's own diagnostics

use tracing_subscriber::EnvFilter;

use crate::config::DiagnosticLevel;

/// Install a formatting subscriber at `level`, letting `RUST_LOG` override it.
///
/// Returns `false` when a global subscriber was already installed, which is
/// the normal case when the bridge is embedded in a host that sets up its
/// own logging.
pub fn init(level: DiagnosticLevel) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_filter()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .is_ok()
}
