//! Bank service integration binary
//!
//! Wires the account service, aggregation engine, and rate feed behind
//! the HTTP gateway and runs everything in one process.

use std::sync::Arc;

use clap::Parser;
use common::decimal::dec;
use common::model::account::NewAccount;
use dotenv::dotenv;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, Level};
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter, FmtSubscriber};

use account_service::{AccountService, RepositoryType};
use aggregation_engine::{AccountPageReader, BalanceAggregator, SchedulingMode};
use api_gateway::config::AppConfig;
use api_gateway::{router, AppState};
use rate_feed::RateFeedService;

/// Command line arguments
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Listening address
    #[clap(short, long, default_value = "127.0.0.1:8080")]
    addr: String,

    /// Seed demo accounts at startup
    #[clap(short, long)]
    demo: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv().ok();

    // Parse command line arguments
    let args = Args::parse();

    // Initialize tracing with debug level if DEBUG=1 in .env
    let env_debug = std::env::var("DEBUG").unwrap_or_else(|_| "0".to_string());
    let log_level = if env_debug == "1" { Level::DEBUG } else { Level::INFO };

    let env_filter = EnvFilter::builder()
        .with_default_directive(log_level.into())
        .parse("tower_http=debug,api_gateway=debug,account_service=debug,aggregation_engine=debug,rate_feed=debug")?;

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE)
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_ok() {
        info!("Tracing initialized");
        if env_debug == "1" {
            debug!("Debug logging enabled");
        }
    }

    info!("Starting bank service...");

    // Initialize services
    let config = AppConfig::new();
    let account_service = match config.database_url.clone() {
        Some(url) => {
            info!("Using PostgreSQL account storage");
            Arc::new(
                AccountService::with_repository(RepositoryType::Postgres(Some(url))).await?,
            )
        }
        None => {
            info!("Using in-memory account storage");
            Arc::new(AccountService::new())
        }
    };
    let rate_feed = Arc::new(RateFeedService::new(config.rates_url.clone()));

    // Seed demo data if requested
    if args.demo {
        info!("Creating demo accounts...");
        create_demo_accounts(&account_service).await?;

        // Show the aggregation engine over the seeded data
        let aggregator = BalanceAggregator::new(
            account_service.clone() as Arc<dyn AccountPageReader>,
            config.agg_config.clone(),
        );
        let result = aggregator.aggregate(SchedulingMode::WorkerPool).await?;
        info!(
            "Demo aggregate: {} batches, total {}",
            result.batch_count, result.total
        );
    }

    let state = Arc::new(AppState {
        account_service,
        agg_config: config.agg_config.clone(),
        rate_feed,
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr: std::net::SocketAddr = args.addr.parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Seed a handful of accounts so the API has data to serve
async fn create_demo_accounts(
    service: &Arc<AccountService>,
) -> Result<(), Box<dyn std::error::Error>> {
    let seeds = [
        ("Alice Campbell", "A001", dec!(1250.50)),
        ("Bob Mwangi", "B002", dec!(310.00)),
        ("Carol Osei", "C003", dec!(9800.75)),
        ("Dan Petrov", "D004", dec!(42.1000)),
        ("Elena Rossi", "E005", dec!(0)),
    ];

    for (name, number, balance) in seeds {
        let account = service
            .create_account(NewAccount {
                name: name.to_string(),
                number: number.to_string(),
                balance,
            })
            .await?;
        info!("Seeded account id={} number={}", account.id, account.number);
    }

    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown");
}
