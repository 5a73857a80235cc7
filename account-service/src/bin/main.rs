use account_service::{AccountService, AccountServiceConfig};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Account Service CLI
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Set the log level
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Commands
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the account service
    Start {
        /// Database URL
        #[arg(short, long)]
        database_url: Option<String>,

        /// Database pool size
        #[arg(short, long)]
        pool_size: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv().ok();

    // Parse command line arguments
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(format!(
            "account_service={}",
            cli.log_level
        )))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Start {
            database_url,
            pool_size,
        } => {
            let config = if let Some(url) = database_url {
                AccountServiceConfig::new(url, pool_size.unwrap_or(5))
            } else {
                AccountServiceConfig::from_env()
            };

            info!(
                "Starting account service with database pool size: {}",
                config.db_pool_size
            );

            let _service = AccountService::with_config(&config).await?;

            info!("Account service started. Press Ctrl+C to stop.");
            match signal::ctrl_c().await {
                Ok(()) => {
                    info!("Shutting down account service...");
                }
                Err(err) => {
                    error!("Error waiting for Ctrl+C: {}", err);
                }
            }
        }
    }

    Ok(())
}
