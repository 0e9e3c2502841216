use crate::handlers;
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};
use std::future::Future;
use tracing::{error, info};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/period", get(handlers::get_period))
        .route(
            "/api/habits",
            get(handlers::get_habits)
                .put(handlers::save_habits)
                .delete(handlers::clear_habits),
        )
        .route("/api/records", post(handlers::insert_records))
        .route("/api/format", get(handlers::format_days))
        .route(
            "/api/journey",
            get(handlers::get_journey)
                .put(handlers::save_journey)
                .delete(handlers::delete_journey),
        )
        .route("/api/journey/complete", post(handlers::complete_journey))
        .with_state(state)
}

/// Resolves when `signal` fires. If the signal cannot be listened for, it
/// never resolves and the server keeps running.
pub async fn shutdown_on(signal: impl Future<Output = std::io::Result<()>>) {
    match signal.await {
        Ok(()) => info!("shutting down"),
        Err(err) => {
            error!("failed to listen for shutdown signal: {err}");
            std::future::pending::<()>().await;
        }
    }
}
