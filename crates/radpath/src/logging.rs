use tracing_subscriber::{EnvFilter, fmt};

/// Filter directive for the global verbosity flags.
///
/// `RUST_LOG`, when set, takes precedence over both flags.
pub fn directive(verbose: u8, quiet: bool) -> &'static str {
    match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "debug",
        (false, _) => "trace",
    }
}

/// Install the stderr log subscriber. Safe to call more than once.
pub fn init(verbose: u8, quiet: bool, ansi: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(directive(verbose, quiet)));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(ansi)
        .with_writer(std::io::stderr)
        .try_init();
}
