//! Listing API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use validator::Validate;

use crate::api::command_meta;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::{AppError, AppResult};
use shared::models::{BoostType, Condition, Listing, ListingDraft};

const DAY_MS: i64 = 86_400_000;

/// Publish request
#[derive(Debug, Deserialize, Validate)]
pub struct PublishRequest {
    #[validate(length(min = 1, max = 120))]
    pub title: String,
    #[validate(length(max = 4000))]
    #[serde(default)]
    pub description: String,
    /// Price in currency unit
    #[validate(range(min = 0.01))]
    pub price: f64,
    pub condition: Condition,
    #[validate(length(min = 1, max = 60))]
    pub category: String,
    #[validate(length(min = 3, max = 10))]
    pub postal_code: String,
    #[validate(length(max = 12))]
    #[serde(default)]
    pub image_urls: Vec<String>,
}

/// Publish a new listing
pub async fn publish(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<PublishRequest>,
) -> AppResult<Json<Listing>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let draft = ListingDraft {
        title: payload.title,
        description: payload.description,
        price: payload.price,
        condition: payload.condition,
        category: payload.category,
        postal_code: payload.postal_code,
        image_urls: payload.image_urls,
    };

    let listing = state.market.publish_listing(draft, &command_meta(&user))?;
    Ok(Json(listing))
}

/// Get listing by id (public)
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Listing>> {
    let listing = state.market.get_listing(&id)?;
    Ok(Json(listing))
}

/// Boost purchase request
#[derive(Debug, Deserialize, Validate)]
pub struct BoostRequest {
    pub boost_type: BoostType,
    #[validate(range(min = 1, max = 30))]
    pub duration_days: i64,
}

/// Purchase a visibility boost for an owned listing
pub async fn boost(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<BoostRequest>,
) -> AppResult<Json<Listing>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let listing = state.market.boost_listing(
        &id,
        payload.boost_type,
        payload.duration_days * DAY_MS,
        &command_meta(&user),
    )?;
    Ok(Json(listing))
}
