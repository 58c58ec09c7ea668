//! HTTP front end
//!
//! Serves the login gate, the two conversation endpoints and the static
//! frontend.
//!
//! # Endpoints
//!
//! - GET /login - login page
//! - POST /login - check the shared password, open a session
//! - GET /logout - close the session
//! - GET / - chat page (session required)
//! - POST /ask-rag - first question (search + answer)
//! - POST /chat-continue - follow-up question
//! - GET /health - liveness and active conversation count
//! - GET /static/* - frontend assets

pub mod error;
pub mod handlers;
pub mod session;
pub mod state;

pub use error::ApiError;
pub use state::AppState;

use axum::routing::{get, post};
use axum::Router;
use sdk::errors::EngineError;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Build the application router
pub fn create_router(state: AppState) -> Router {
    let assets = ServeDir::new(state.settings.static_root.join("static"));

    Router::new()
        .route("/", get(handlers::index))
        .route("/login", get(handlers::login_page).post(handlers::login))
        .route("/logout", get(handlers::logout))
        .route("/ask-rag", post(handlers::ask_rag))
        .route("/chat-continue", post(handlers::chat_continue))
        .route("/health", get(handlers::health))
        .nest_service("/static", assets)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `addr` and serve until Ctrl-C
pub async fn serve(state: AppState, addr: &str) -> Result<(), EngineError> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| EngineError::Server(format!("Failed to bind to {}: {}", addr, e)))?;

    let local = listener
        .local_addr()
        .map_err(|e| EngineError::Server(format!("Failed to get local address: {}", e)))?;

    tracing::info!("Listening on http://{}", local);

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("Shutting down gracefully");
        })
        .await
        .map_err(|e| EngineError::Server(e.to_string()))
}
