//! QuestArena Engine - Main entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use questarena_engine::app::{App, Ports};
use questarena_engine::infrastructure::{
    auth::SignedTokenVerifier,
    catalog::load_skill_catalog,
    clock::{SystemClock, SystemRandom},
    config::ArenaConfig,
    history::SqliteBattleHistory,
    ports::{BattleHistory, ClockPort, ProfileStore},
    profile_store::{HttpProfileStore, InMemoryProfileStore},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from repo root (the engine may be started from `crates/engine`).
    load_dotenv_from_repo_root();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "questarena_engine=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting QuestArena Engine");

    // Load configuration
    let config = ArenaConfig::from_env();
    if config.uses_dev_secret() {
        tracing::warn!("ARENA_TOKEN_SECRET not set, using the development secret");
    }

    let clock: Arc<dyn ClockPort> = Arc::new(SystemClock::new());

    let catalog = load_skill_catalog(config.skill_catalog_path.as_deref())?;

    let profiles: Arc<dyn ProfileStore> = match &config.profile_store_url {
        Some(url) => {
            tracing::info!("Using profile store at {}", url);
            Arc::new(HttpProfileStore::new(url))
        }
        None => {
            tracing::info!("PROFILE_STORE_URL not set, keeping profiles in memory");
            Arc::new(InMemoryProfileStore::new())
        }
    };

    let history: Option<Arc<dyn BattleHistory>> = match &config.battle_history_db {
        Some(db) => {
            tracing::info!("Recording battle history in {}", db);
            Some(Arc::new(SqliteBattleHistory::new(db, clock.clone()).await?))
        }
        None => None,
    };

    let ports = Ports {
        clock: clock.clone(),
        random: Arc::new(SystemRandom::new()),
        tokens: Arc::new(SignedTokenVerifier::new(
            config.token_secret.clone(),
            clock.clone(),
        )),
        profiles,
        history,
    };

    // Create application
    let app = Arc::new(App::new(config.clone(), catalog, ports));

    // Spawn session reaper
    app.use_cases
        .arena
        .reaper
        .clone()
        .spawn(config.reaper_interval);

    // Build router
    let mut router = questarena_engine::api::router(app);

    if let Some(cors) = build_cors_layer_from_env() {
        router = router.layer(cors);
    }

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server_host, config.server_port).parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}

fn build_cors_layer_from_env() -> Option<CorsLayer> {
    let allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())?;

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        // REST actions send a bearer token and JSON body, which trigger preflights.
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    if allowed_origins == "*" {
        return Some(cors.allow_origin(Any));
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| HeaderValue::from_str(s).ok())
        .collect();

    if origins.is_empty() {
        return None;
    }

    Some(cors.allow_origin(origins))
}
