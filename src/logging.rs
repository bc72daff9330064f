use std::io::IsTerminal;

use tracing_subscriber::EnvFilter;

/// Install the stderr diagnostics subscriber.
///
/// `CB_LOG` takes an `EnvFilter` directive and wins when set. Otherwise
/// `verbose` selects `info`, and only errors are shown without it.
pub fn init(verbose: bool) {
    let default = if verbose { "cb=info" } else { "cb=error" };
    let filter = EnvFilter::try_from_env("CB_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    // A second init (e.g. from tests) is harmless.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .without_time()
        .with_target(false)
        .try_init();
}
