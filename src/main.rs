use barscreen::cli::{run, Cli};
use clap::Parser;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> std::process::ExitCode {
    let filter_layer = EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into());
    let fmt_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();

    run(Cli::parse())
}
