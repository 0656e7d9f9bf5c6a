//! DungeonMind Engine - Main entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dungeonmind_engine::api;
use dungeonmind_engine::infrastructure::deepseek::DeepSeekClient;
use dungeonmind_engine::App;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from a local .env if present.
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dungeonmind_engine=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting DungeonMind Engine");

    // Load configuration
    let server_host = std::env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let server_port: u16 = std::env::var("SERVER_PORT")
        .or_else(|_| std::env::var("PORT"))
        .unwrap_or_else(|_| "3000".into())
        .parse()
        .unwrap_or(3000);

    // Create the LLM client. A missing credential degrades every turn to the
    // fallback state instead of refusing to start.
    let llm = DeepSeekClient::from_env();
    if !llm.has_credential() {
        tracing::warn!(
            "DEEPSEEK_API_KEY is not set; all turns will use the fallback state"
        );
    }

    // Create application
    let app = Arc::new(App::new(Arc::new(llm)));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let router = api::http::routes()
        .with_state(app)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{server_host}:{server_port}").parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
