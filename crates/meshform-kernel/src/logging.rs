//! `tracing` bootstrap for provider processes.
//!
//! Output goes to stderr; stdout belongs to the host protocol. `RUST_LOG`
//! wins over the default directive when set.

use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_DIRECTIVE: &str = "info,meshform_kernel=debug,meshform_foundation=debug";

/// Install a global fmt subscriber.
///
/// Returns `false` if a global subscriber was already installed, which is
/// normal under test harnesses and embedding hosts.
pub fn try_init_logging(default_directive: &str, json: bool) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);

    if json {
        builder.json().try_init().is_ok()
    } else {
        builder.try_init().is_ok()
    }
}
