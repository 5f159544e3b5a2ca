mod cli;
mod commands;
mod http_source;

use clap::Parser;

fn main() -> anyhow::Result<()> {
    // RUST_LOG overrides, e.g. RUST_LOG=debug or RUST_LOG=ffmpeg_source=trace
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    cli::Cli::parse().run()
}
