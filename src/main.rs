use clap::Parser;
use larder::{
    cli::{commands, Cli, Commands},
    config::Settings,
    Result,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if it exists
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,larder=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let settings = Settings::from_env()?;
    settings.validate()?;

    match cli.command {
        Commands::Extract { input } => commands::extract(&settings, input).await?,
        Commands::Ingest { input } => commands::ingest(&settings, input).await?,
        Commands::Search { query, limit } => commands::search(&settings, &query, limit).await?,
        Commands::Ask { query, top_k } => commands::ask(&settings, &query, top_k).await?,
        Commands::Repl => commands::repl(&settings).await?,
        Commands::Stats => commands::stats(&settings).await?,
    }

    Ok(())
}
