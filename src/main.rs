//! Emissary - personal AI chatbot API
//!
//! Serves a conversational endpoint that answers visitor questions as a
//! configured persona, backed by an OpenAI-compatible chat completion API.
//! The model can call two local tools mid-conversation: one records a
//! visitor's contact details, the other records questions the persona
//! could not answer. Both forward a best-effort push notification.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod conversation;
mod core;
mod notify;
mod persona;
mod providers;
mod routes;
#[cfg(test)]
mod test_support;
mod tools;

use crate::core::ChatEngine;
use config::Config;
use notify::Notifier;
use persona::Persona;
use providers::openai::{OpenAiConfig, OpenAiProvider};
use tools::ToolRegistry;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ChatEngine>,
    pub persona: Arc<Persona>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "emissary_ai=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    let persona = Arc::new(Persona::load(&config));
    tracing::info!(name = %persona.name, "persona loaded");

    let notifier = Arc::new(Notifier::from_config(&config));
    if !notifier.is_configured() {
        tracing::info!("push notifications disabled (no Pushover credentials)");
    }

    let registry = Arc::new(ToolRegistry::builtin(notifier));
    tracing::info!("registered {} tool(s)", registry.len());

    let provider = Arc::new(OpenAiProvider::new(OpenAiConfig::from_config(&config)));
    let engine = Arc::new(ChatEngine::new(provider, registry, persona.clone()));

    let state = AppState { engine, persona };

    let app = Router::new()
        .merge(routes::router())
        .layer(cors_layer(&config))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    tracing::info!("emissary API listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Only the configured origins may call the API from a browser.
fn cors_layer(config: &Config) -> CorsLayer {
    let mut origins = Vec::new();
    for origin in &config.allowed_origins {
        match origin.parse::<HeaderValue>() {
            Ok(value) => origins.push(value),
            Err(_) => tracing::warn!(%origin, "ignoring invalid allowed origin"),
        }
    }

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
}
