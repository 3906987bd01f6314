//! Back-office HTTP application.
//!
//! Every route answers with the `{code, data | message}` envelope; code 0
//! means success, otherwise `code` carries the HTTP status.

pub mod handlers;
pub mod response;
pub mod state;

use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::validate_listen_addr;
use crate::error::Result;
pub use self::state::AppState;

/// Create the router with all routes and middleware.
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/system/user/list", get(handlers::list_users))
        .route("/api/system/user/get/:id", get(handlers::get_user))
        .route("/api/quant/type", get(handlers::quant_types))
        .route("/api/time/field/list", get(handlers::list_fields))
        .route("/api/time/quest/list", get(handlers::list_quests))
        .route("/api/time/quest/target/list", get(handlers::list_quest_targets))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve on an already bound listener until `shutdown` is cancelled.
pub async fn serve(listener: TcpListener, app: Router, shutdown: CancellationToken) -> Result<()> {
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;
    info!("Server stopped");
    Ok(())
}

/// Bind `addr` (`host:port`, host names allowed) and serve until `shutdown`
/// is cancelled.
pub async fn run_server(app: Router, addr: &str, shutdown: CancellationToken) -> Result<()> {
    validate_listen_addr(addr)?;
    let listener = TcpListener::bind(addr).await?;
    info!("Server listening on {}", listener.local_addr()?);
    serve(listener, app, shutdown).await
}
