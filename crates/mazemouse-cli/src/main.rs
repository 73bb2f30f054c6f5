mod command;
mod config;
mod util;

fn main() -> anyhow::Result<()> {
    init_tracing();
    command::run()
}

/// Logs go to stderr so JSON written to stdout stays machine-readable.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
