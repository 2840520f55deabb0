//! Valoriza - CLI for the Valoriza Vilhena tourism gamification backend

use clap::Parser;
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use valoriza_client::{
    cli::{self, Command},
    config::Args,
    ApiClient, AppState, ClientConfig, SessionStore,
};

#[derive(Parser, Debug)]
#[command(name = "valoriza")]
#[command(about = "Scan places, earn points, complete daily missions")]
struct Cli {
    #[command(flatten)]
    config: Args,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Initialize tracing/logging
    let log_level = cli.config.log_level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("valoriza_client={},warn", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = cli.config.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    let store = SessionStore::new(cli.config.session_path());
    let mut state = AppState::load(store)?;

    let mut client = ApiClient::new(ClientConfig {
        base_url: cli.config.api_url.clone(),
        token: state.token().map(String::from),
        timeout_secs: cli.config.timeout_secs,
    })?;

    let output = cli::execute(cli.command, &mut client, &mut state).await?;
    println!("{}", output);

    Ok(())
}
