mod config;
mod errors;
mod extraction;
mod llm_client;
mod models;
mod resume;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::resume::ResumeParser;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={},tower_http={}",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log,
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume parse API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client
    let llm = LlmClient::new(
        config.anthropic_api_key.clone(),
        config.anthropic_api_url.clone(),
        Duration::from_secs(config.llm_timeout_secs),
    )?;
    if llm.has_credential() {
        info!(
            "LLM client initialized (model: {}, timeout: {}s)",
            llm_client::MODEL,
            config.llm_timeout_secs
        );
    } else {
        warn!("ANTHROPIC_API_KEY is not set; every extraction will fail at the model stage");
    }

    let parser = ResumeParser::new(
        Arc::new(llm),
        config.min_text_length,
        config.max_prompt_chars,
    );
    info!(
        "Resume parser ready (min text: {} chars, prompt cap: {} chars, upload cap: {} bytes)",
        config.min_text_length, config.max_prompt_chars, config.max_upload_bytes
    );

    let state = AppState {
        parser,
        config: config.clone(),
    };

    let app = build_router(state).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
