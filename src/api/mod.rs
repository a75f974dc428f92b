//! HTTP API server for the spelling bee trainer

pub mod game;
pub mod health;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::collab::{ContextProvider, Speaker, Transcriber, WordSource};
use crate::config::DEFAULT_LISTEN_SECS;
use crate::session::GameSession;
use crate::turn::TurnCoordinator;
use crate::Result;

/// Shared state for API handlers
pub struct ApiState {
    /// The live game; never held across speech or transcription
    pub session: Mutex<GameSession>,
    pub turns: TurnCoordinator,
    pub transcriber: Arc<dyn Transcriber>,
    pub context: Arc<dyn ContextProvider>,
    pub words: Arc<dyn WordSource>,
    /// How long one listen records
    pub listen_duration: Duration,
}

impl ApiState {
    /// Speak `text` in the background
    ///
    /// Returns once the floor is held, so a following listen waits for it.
    pub async fn announce(&self, text: impl Into<String>) {
        drop(self.turns.begin_speak(text).await);
    }
}

/// Configuration for building an API server
pub struct ApiServerBuilder {
    session: GameSession,
    speaker: Arc<dyn Speaker>,
    transcriber: Arc<dyn Transcriber>,
    context: Arc<dyn ContextProvider>,
    words: Arc<dyn WordSource>,
    port: u16,
    static_dir: Option<PathBuf>,
    listen_duration: Duration,
}

impl ApiServerBuilder {
    /// Create a new API server builder
    #[must_use]
    pub fn new(
        session: GameSession,
        speaker: Arc<dyn Speaker>,
        transcriber: Arc<dyn Transcriber>,
        context: Arc<dyn ContextProvider>,
        words: Arc<dyn WordSource>,
    ) -> Self {
        Self {
            session,
            speaker,
            transcriber,
            context,
            words,
            port: crate::config::DEFAULT_PORT,
            static_dir: None,
            listen_duration: Duration::from_secs(DEFAULT_LISTEN_SECS),
        }
    }

    /// Set the listen port
    #[must_use]
    pub const fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Serve the web UI from `dir`
    #[must_use]
    pub fn static_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.static_dir = dir;
        self
    }

    /// Set how long each listen records
    #[must_use]
    pub const fn listen_duration(mut self, duration: Duration) -> Self {
        self.listen_duration = duration;
        self
    }

    /// Build the API server
    #[must_use]
    pub fn build(self) -> ApiServer {
        let state = Arc::new(ApiState {
            session: Mutex::new(self.session),
            turns: TurnCoordinator::new(self.speaker),
            transcriber: self.transcriber,
            context: self.context,
            words: self.words,
            listen_duration: self.listen_duration,
        });

        ApiServer {
            state,
            port: self.port,
            static_dir: self.static_dir,
        }
    }
}

/// API server
pub struct ApiServer {
    state: Arc<ApiState>,
    port: u16,
    static_dir: Option<PathBuf>,
}

impl ApiServer {
    /// Shared handler state
    #[must_use]
    pub fn state(&self) -> Arc<ApiState> {
        Arc::clone(&self.state)
    }

    /// Build the router with all routes
    #[must_use]
    pub fn router(&self) -> Router {
        let mut router = Router::new()
            .nest("/api", game::router(self.state.clone()))
            .merge(health::router());

        // Serve static files if configured
        if let Some(static_dir) = &self.static_dir {
            let index_file = static_dir.join("index.html");
            let serve_dir = ServeDir::new(static_dir).not_found_service(ServeFile::new(&index_file));

            router = router.fallback_service(serve_dir);
            tracing::info!(path = %static_dir.display(), "serving static files");
        }

        // CORS layer for cross-origin requests from the web UI
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        router.layer(cors).layer(TraceLayer::new_for_http())
    }

    /// Run the API server
    ///
    /// # Errors
    ///
    /// Returns error if server fails to bind or run
    pub async fn run(self) -> Result<()> {
        let addr = format!("0.0.0.0:{}", self.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| crate::Error::Config(format!("failed to bind API server: {e}")))?;

        tracing::info!(port = self.port, "API server listening");

        axum::serve(listener, self.router())
            .await
            .map_err(|e| crate::Error::Config(format!("API server error: {e}")))?;

        Ok(())
    }

    /// Run the API server in a background task
    #[must_use]
    pub fn spawn(self) -> tokio::task::JoinHandle<Result<()>> {
        tokio::spawn(async move { self.run().await })
    }
}
