mod config;
mod error;
mod game;
mod models;
mod questions;
mod routes;
mod server;
mod websocket;

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use anyhow::Result;
use axum::{routing::get, Router};
use config::Config;
use dashmap::DashMap;
use questions::{QuestionBank, QuestionCatalog};
use server::GameServer;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

/// How often idle games are swept
pub const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(15);

/// Application state shared across all handlers
pub struct AppState {
    pub config: Config,
    pub catalog: Arc<QuestionCatalog>,
    /// Games in progress, keyed by game id
    pub sessions: DashMap<Uuid, GameSession>,
}

impl AppState {
    pub fn new(config: Config, catalog: QuestionCatalog) -> Self {
        Self {
            config,
            catalog: Arc::new(catalog),
            sessions: DashMap::new(),
        }
    }
}

/// In-memory game session data
pub struct GameSession {
    pub server: GameServer<QuestionBank>,
    pub last_active: Instant,
}

impl GameSession {
    pub fn new(server: GameServer<QuestionBank>) -> Self {
        Self {
            server,
            last_active: Instant::now(),
        }
    }

    pub fn touch(&mut self) {
        self.last_active = Instant::now();
    }

    pub fn is_idle(&self, now: Instant, timeout: Duration) -> bool {
        now.saturating_duration_since(self.last_active) > timeout
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trivial_compute_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Trivial Compute server...");

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded");

    // Load question catalog
    let catalog = match QuestionCatalog::load(&config.game.questions_path).await {
        Ok(catalog) => catalog,
        Err(e) => {
            tracing::warn!("Failed to load questions: {:#}. Using an empty catalog.", e);
            tracing::warn!(
                "Write a question catalog to {} for full functionality",
                config.game.questions_path
            );
            QuestionCatalog::empty()
        }
    };

    let state = Arc::new(AppState::new(config.clone(), catalog));

    // Spawn background task to clean up idle games
    let cleanup_state = state.clone();
    tokio::spawn(async move {
        session_cleanup_task(cleanup_state).await;
    });

    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router
    let app = Router::new()
        // WebSocket endpoint
        .route("/ws", get(websocket::handle_websocket))
        // API routes
        .merge(routes::create_routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr = config.server_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("WebSocket endpoint: ws://{}/ws", addr);
    tracing::info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Background task that periodically discards games nobody has touched
async fn session_cleanup_task(state: Arc<AppState>) {
    let mut interval = tokio::time::interval(SESSION_SWEEP_INTERVAL);

    loop {
        interval.tick().await;
        remove_idle_sessions(&state, Instant::now());
    }
}

/// Drop every session idle past the configured timeout; returns how many went
fn remove_idle_sessions(state: &AppState, now: Instant) -> usize {
    let timeout = state.config.session_idle_timeout();
    let before = state.sessions.len();

    state.sessions.retain(|game_id, session| {
        let idle = session.is_idle(now, timeout);
        if idle {
            tracing::info!("Removed idle game {} (timeout expired)", game_id);
        }
        !idle
    });

    before.saturating_sub(state.sessions.len())
}
