use crate::constants::{LOG_ENV, PKG_NAME};
use tracing_subscriber::EnvFilter;

/// Installs the global `tracing` subscriber, writing to stderr.
///
/// `BORGRUN_LOG` takes any `EnvFilter` directive. Without it only warnings
/// are shown, or this crate's debug events when `verbose` is set.
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| default_filter(verbose));
    // A second init (e.g. from tests) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn default_filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(format!("warn,{PKG_NAME}=debug"))
    } else {
        EnvFilter::new("warn")
    }
}
