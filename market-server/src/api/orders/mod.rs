//! Order API Module
//!
//! Reservation, the payment collaborator callback and the fulfillment
//! transitions. All mutations go through the MarketManager.

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

/// Order router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/reserve", post(handler::reserve))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/payment", post(handler::payment_callback))
        .route("/{id}/ship", post(handler::ship))
        .route("/{id}/delivered", post(handler::confirm_delivery))
        .route("/{id}/complete", post(handler::complete))
}
