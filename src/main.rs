use std::path::Path;
use std::sync::Arc;

use mtgate::application::handlers::webhook_handler;
use mtgate::application::services::webhook_gateway::WebhookGateway;
use mtgate::config::GatewayConfig;
use mtgate::domain::repositories::trading_terminal::TradingTerminal;
use mtgate::domain::services::session_manager::SessionManager;
use mtgate::infrastructure::account_store::AccountStore;
use mtgate::infrastructure::mock_terminal::MockTradingTerminal;
use mtgate::infrastructure::mtapi_client::MtApiClient;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let file_appender = tracing_appender::rolling::daily(dir, "server.log");
            let (writer, guard) = tracing_appender::non_blocking(file_appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mtgate=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let config = GatewayConfig::from_env();
    // Keeps the file writer flushing until shutdown
    let _log_guard = init_tracing(config.log_dir.as_deref());

    info!("MT4 webhook gateway starting...");

    let registry = Arc::new(AccountStore::load(&config.accounts_file)?);
    if registry.is_empty() {
        warn!("no accounts configured");
    }

    let terminal: Arc<dyn TradingTerminal> = if config.dry_run {
        warn!("DRY_RUN enabled, orders go to the in-memory terminal");
        Arc::new(MockTradingTerminal::new())
    } else {
        Arc::new(MtApiClient::new(config.mtapi())?)
    };
    info!(
        "Terminal backend: {} ({}), session TTL {}s, call timeout {}ms",
        terminal.name(),
        config.api_base,
        config.session_ttl.as_secs(),
        config.remote_timeout.as_millis()
    );

    let sessions = SessionManager::with_ttl(registry.clone(), terminal.clone(), config.session_ttl);
    let gateway = Arc::new(WebhookGateway::new(registry, terminal, sessions));
    let app = webhook_handler::router(gateway, config.max_body_bytes);

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    info!("Listening on {}", config.listen_addr);

    let shutdown_signal = async {
        let ctrl_c = async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => info!("Received Ctrl+C signal"),
                Err(e) => error!("Failed to install Ctrl+C handler: {}", e),
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut sig) => {
                    sig.recv().await;
                    info!("Received SIGTERM signal");
                }
                Err(e) => error!("Failed to install SIGTERM handler: {}", e),
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {},
            _ = terminate => {},
        }
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Shutdown complete");
    Ok(())
}
