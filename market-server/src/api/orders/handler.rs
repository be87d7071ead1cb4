//! Order API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::api::command_meta;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::market::CancelReason;
use crate::utils::{AppError, AppResult};
use shared::models::{DeliveryMethod, Order, OrderDraft, ShippingAddress};

/// Reservation request
#[derive(Debug, Deserialize)]
pub struct ReserveRequest {
    pub listing_id: String,
    pub delivery_method: DeliveryMethod,
    pub shipping_address: Option<ShippingAddress>,
}

#[derive(Debug, Serialize)]
pub struct ReserveResponse {
    pub order_id: String,
}

/// Atomically reserve a listing and create the pending order
pub async fn reserve(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<ReserveRequest>,
) -> AppResult<Json<ReserveResponse>> {
    let draft = OrderDraft {
        delivery_method: payload.delivery_method,
        shipping_address: payload.shipping_address,
    };

    let order_id = state
        .market
        .reserve_listing(&payload.listing_id, draft, &command_meta(&user))
        .await?;
    Ok(Json(ReserveResponse { order_id }))
}

/// Get order by id (parties and support only)
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    let order = state.market.get_order(&id)?;
    if user.id != order.buyer_id && user.id != order.seller_id && !user.is_support() {
        return Err(AppError::forbidden("Not a party to this order"));
    }
    Ok(Json(order))
}

/// Payment capture outcome reported by the payment collaborator
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentOutcome {
    Confirmed,
    Failed,
}

#[derive(Debug, Deserialize)]
pub struct PaymentCallbackRequest {
    pub outcome: PaymentOutcome,
}

/// Consume the payment collaborator's confirm/fail callback
pub async fn payment_callback(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<PaymentCallbackRequest>,
) -> AppResult<Json<Order>> {
    let meta = command_meta(&user);
    match payload.outcome {
        PaymentOutcome::Confirmed => state.market.confirm_payment(&id, &meta).await?,
        PaymentOutcome::Failed => {
            state
                .market
                .cancel_order(&id, CancelReason::PaymentFailed, &meta)
                .await?
        }
    }
    Ok(Json(state.market.get_order(&id)?))
}

/// Ship request
#[derive(Debug, Deserialize, Validate)]
pub struct ShipRequest {
    #[validate(length(min = 1, max = 64))]
    pub tracking_number: String,
}

/// Seller marks the order shipped
pub async fn ship(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<ShipRequest>,
) -> AppResult<Json<Order>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    state
        .market
        .ship_order(&id, &payload.tracking_number, &command_meta(&user))
        .await?;
    Ok(Json(state.market.get_order(&id)?))
}

/// Buyer confirms receipt
pub async fn confirm_delivery(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    state
        .market
        .confirm_delivery(&id, &command_meta(&user))
        .await?;
    Ok(Json(state.market.get_order(&id)?))
}

/// Buyer confirms completion
pub async fn complete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    state
        .market
        .complete_order(&id, &command_meta(&user))
        .await?;
    Ok(Json(state.market.get_order(&id)?))
}
