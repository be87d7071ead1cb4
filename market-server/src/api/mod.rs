//! HTTP API
//!
//! One module per resource, each exposing a `router()`. Handlers
//! authenticate through the `CurrentUser` extractor, stamp the request
//! into a `CommandMeta` and call the engine; engine errors convert into
//! `AppError` responses.

pub mod disputes;
pub mod health;
pub mod listings;
pub mod orders;
pub mod reviews;

use axum::Router;
use http::{HeaderName, HeaderValue};
use tower_http::cors::CorsLayer;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::market::CommandMeta;
use crate::utils::now_millis;

/// Custom request ID generator
#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        Some(RequestId::new(HeaderValue::from_str(&id).unwrap()))
    }
}

/// Build a router with all routes registered (no middleware, no state)
pub fn build_router() -> Router<ServerState> {
    Router::new()
        .merge(listings::router())
        .merge(orders::router())
        .merge(disputes::router())
        .merge(reviews::router())
        .merge(health::router())
}

/// Build the fully layered application
pub fn build_app() -> Router<ServerState> {
    build_router()
        // CORS - the mobile clients are cross-origin
        .layer(CorsLayer::permissive())
        // Request tracing (logs at INFO level)
        .layer(TraceLayer::new_for_http())
        // Unique ID per request, propagated to the response
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static("x-request-id"),
            XRequestId,
        ))
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            "x-request-id",
        )))
}

/// Stamp the authenticated caller and the current time into command
/// metadata; commands never read the clock themselves
pub(crate) fn command_meta(user: &CurrentUser) -> CommandMeta {
    CommandMeta {
        caller_id: user.id.clone(),
        support: user.is_support(),
        timestamp: now_millis(),
    }
}
