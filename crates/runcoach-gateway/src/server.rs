//! Service wiring: journal, oracle, dispatcher, bot, and the health endpoint

use crate::bot::{Bot, MessageHandler};
use crate::config::{RuncoachConfig, Secrets};
use crate::router::Router as MessageRouter;
use crate::telegram::TelegramClient;
use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};
use runcoach_agent::{Dispatcher, IntentExtractor};
use runcoach_journal::Journal;
use runcoach_llm::AnthropicProvider;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

struct HealthState {
    journal: Arc<Journal>,
}

pub async fn start_bot(config: RuncoachConfig, secrets: Secrets) -> anyhow::Result<()> {
    let shutdown = CancellationToken::new();

    let journal = Arc::new(Journal::open(config.journal.path.clone()));

    let mut provider = AnthropicProvider::new(&secrets.oracle_api_key);
    if let Some(url) = &config.oracle.base_url {
        info!("Using custom API URL: {}", url);
        provider = provider.with_base_url(url.clone());
    }
    let extractor = IntentExtractor::new(Arc::new(provider), config.extractor_config())
        .with_cancel(shutdown.child_token());
    let dispatcher = Arc::new(Dispatcher::new(journal.clone(), extractor));

    let handler = MessageHandler::new(MessageRouter::new(&config.bot.username), dispatcher);
    let telegram = TelegramClient::new(&secrets.telegram_bot_token)
        .with_base_url(&config.bot.api_base_url);
    let bot = Bot::new(telegram, handler, config.bot.poll_timeout_secs, shutdown.clone());

    info!("Runcoach v{} starting", env!("CARGO_PKG_VERSION"));
    info!("  Bot:     {}", config.bot.username);
    info!("  Model:   {}", config.oracle.model);
    info!("  Journal: {}", journal.path().display());

    let health = match config.bot.health_port {
        Some(port) => {
            let bind_addr = SocketAddr::from(([0, 0, 0, 0], port));
            let listener = TcpListener::bind(bind_addr).await?;
            info!("  Health:  http://{}/health", bind_addr);
            Some(tokio::spawn(serve_health(listener, journal.clone(), shutdown.clone())))
        }
        None => None,
    };

    let ctrl_c = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown requested");
        }
        ctrl_c.cancel();
    });

    let result = bot.run().await;
    shutdown.cancel();

    if let Some(health) = health {
        match health.await {
            Ok(Err(e)) => error!("Health server failed: {}", e),
            Err(e) => error!("Health server task panicked: {}", e),
            Ok(Ok(())) => {}
        }
    }
    result
}

/// Serve `GET /health` on `listener` until `shutdown` fires.
pub async fn serve_health(
    listener: TcpListener,
    journal: Arc<Journal>,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    axum::serve(listener, health_router(journal))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;
    Ok(())
}

pub fn health_router(journal: Arc<Journal>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .with_state(Arc::new(HealthState { journal }))
}

async fn health_handler(State(state): State<Arc<HealthState>>) -> impl IntoResponse {
    let stats = state.journal.stats().await;
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "users": stats.users,
        "entries": stats.entries,
    }))
}
