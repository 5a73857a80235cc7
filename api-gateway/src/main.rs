//! API Gateway for the bank account platform

use std::sync::Arc;

use clap::Parser;
use dotenv::dotenv;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::{debug, info, Level};
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter, FmtSubscriber};

use account_service::{AccountService, RepositoryType};
use api_gateway::config::AppConfig;
use api_gateway::{router, AppState};
use rate_feed::RateFeedService;

/// Bank account API server
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Listening address
    #[clap(short, long, default_value = "127.0.0.1:8080")]
    addr: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv().ok();

    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging with debug level when DEBUG=1 env var is set
    let env = std::env::var("DEBUG").unwrap_or_else(|_| "0".to_string());
    let log_level = if env == "1" { Level::DEBUG } else { Level::INFO };

    let env_filter = EnvFilter::builder()
        .with_default_directive(log_level.into())
        .parse("tower_http=debug,api_gateway=debug")?;

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    debug!("Debug logging enabled");

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

    let state = Arc::new(AppState {
        account_service,
        agg_config: config.agg_config.clone(),
        rate_feed,
    });

    // Set up CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = router(state).layer(cors).layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(log_level))
            .on_request(DefaultOnRequest::new().level(log_level))
            .on_response(DefaultOnResponse::new().level(log_level)),
    );

    // Start the server
    let addr: std::net::SocketAddr = args.addr.parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);

    // Run until interrupt signal
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

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
