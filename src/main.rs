use std::sync::{Arc, Mutex};
use std::time::Duration;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use telecom_assistant::config::AppConfig;
use telecom_assistant::db;
use telecom_assistant::handlers;
use telecom_assistant::services::ai::provider_from_config;
use telecom_assistant::services::dispatch::Dispatcher;
use telecom_assistant::services::event_store::{seed_demo_data, SqliteEventStore};
use telecom_assistant::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let conn = db::init_db(&config.database_url)?;
    if seed_demo_data(&conn, chrono::Utc::now().date_naive())? {
        tracing::info!(database = %config.database_url, "initialized demo customer");
    }

    let llm = provider_from_config(&config)?;
    let store = SqliteEventStore::new(
        Arc::new(Mutex::new(conn)),
        Duration::from_millis(config.store_latency_ms),
    );

    let dispatcher = Dispatcher::new(llm, Arc::new(store));
    let session = dispatcher.start_session().await?;

    let state = Arc::new(AppState::new(config.clone(), dispatcher, session));
    let app = handlers::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
