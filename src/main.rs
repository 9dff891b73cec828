use clap::Parser;
use tracing_subscriber::EnvFilter;

use orangeforum::cli::{Cli, run};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("orangeforum=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    run(Cli::parse()).await
}
