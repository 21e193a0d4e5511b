mod analysis;
mod config;
mod errors;
mod llm_client;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::client::AnalysisClient;
use crate::config::Config;
use crate::llm_client::GeminiClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails only on malformed numeric settings)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume Match API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize the model client; without a usable key the service runs degraded
    let analyzer = build_analyzer(&config);

    let state = AppState {
        config: config.clone(),
        analyzer,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_analyzer(config: &Config) -> AnalysisClient {
    let Some(api_key) = config.usable_api_key() else {
        warn!("GEMINI_API_KEY not set; /compare will fail until it is configured");
        warn!("Create a key at https://aistudio.google.com/app/apikey and add GEMINI_API_KEY=<key> to .env");
        return AnalysisClient::unconfigured();
    };

    match GeminiClient::new(api_key.to_string(), &config.gemini_api_base) {
        Ok(client) => {
            info!("Gemini client initialized (model: {})", llm_client::MODEL);
            AnalysisClient::new(Arc::new(client))
        }
        Err(e) => {
            error!("Error initializing Gemini client: {e}");
            AnalysisClient::unconfigured()
        }
    }
}
