//! Dispute API Module

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

/// Dispute router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/disputes", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::open))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/escalate", post(handler::escalate))
}
