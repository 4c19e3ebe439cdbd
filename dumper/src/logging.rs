use tracing_subscriber::{EnvFilter, fmt};

pub fn init(verbose: bool) {
    // RUST_LOG=info,debug,...  (defaults to info, debug with --verbose)
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}
