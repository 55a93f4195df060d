use clap::Parser;
use dotenv::dotenv;
use storage_scripts::{cli::Cli, config::Config, errors::ScriptError};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), ScriptError> {
    // Load .env file
    dotenv().ok();

    let Cli { network, command } = Cli::parse();

    tracing_subscriber::fmt()
        .pretty()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();

    command.run(&config, network.as_deref()).await
}
