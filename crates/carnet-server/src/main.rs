mod cli;
mod config;
mod http;
mod serve;

use clap::Parser;
use cli::{Cli, Commands};
use config::CarnetConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve => {
            let config = CarnetConfig::load_or_default(&cli.config).with_data_dir(cli.data_dir);
            serve::run(config).await
        }
        Commands::Config(cmd) => cli::config_cmd::run(cmd, &cli.config, cli.data_dir),
        Commands::Entry(cmd) => {
            cli::entry::run(cmd, &cli::connect(&cli.server, cli.user)?).await
        }
        Commands::Link(cmd) => cli::link::run(cmd, &cli::connect(&cli.server, cli.user)?).await,
        Commands::Graph(cmd) => {
            cli::graph::run(cmd, &cli::connect(&cli.server, cli.user)?).await
        }
    }
}
