//! HTTP surface: router assembly and the serve loop.

pub mod error;
pub mod handlers;
pub mod session;
pub mod state;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;
use tracing::info;

pub use state::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/process", post(handlers::process))
        .route("/score", post(handlers::submit_score))
        .nest("/api", api_routes())
        .layer(TraceLayer::new_for_http())
}

fn api_routes() -> Router<ServerState> {
    Router::new()
        .route("/sentence", get(handlers::random_sentence))
        .route("/leaderboard", get(handlers::leaderboard))
}

/// The fully wired application, ready to serve or to drive in-process from
/// tests.
pub fn app(state: ServerState) -> Router {
    router().with_state(state)
}

pub async fn serve(state: ServerState, bind_addr: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!(addr = %listener.local_addr()?, "listening");
    axum::serve(listener, app(state)).await?;
    Ok(())
}
