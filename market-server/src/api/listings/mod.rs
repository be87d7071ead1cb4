//! Listing API Module

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

/// Listing router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/listings", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::publish))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/boost", post(handler::boost))
}
