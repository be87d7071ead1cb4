//! Review API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::api::command_meta;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::{AppError, AppResult};
use shared::models::SellerRating;

/// Review submission request
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitReviewRequest {
    pub order_id: String,
    #[validate(range(min = 1, max = 5))]
    pub rating: u8,
    #[validate(length(max = 1000))]
    #[serde(default)]
    pub comment: String,
}

#[derive(Debug, Serialize)]
pub struct SubmitReviewResponse {
    pub review_id: String,
}

/// Submit the buyer's review for an order
pub async fn submit(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<SubmitReviewRequest>,
) -> AppResult<Json<SubmitReviewResponse>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let review_id = state
        .market
        .submit_review(
            &payload.order_id,
            payload.rating,
            &payload.comment,
            &command_meta(&user),
        )
        .await?;
    Ok(Json(SubmitReviewResponse { review_id }))
}

/// Current rating aggregate for a seller (public)
pub async fn seller_rating(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<SellerRating>> {
    Ok(Json(state.market.seller_rating(&id)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_bounds_validated_at_the_boundary() {
        let ok = SubmitReviewRequest {
            order_id: "order-1".to_string(),
            rating: 5,
            comment: String::new(),
        };
        assert!(ok.validate().is_ok());

        for bad in [0u8, 6] {
            let req = SubmitReviewRequest {
                order_id: "order-1".to_string(),
                rating: bad,
                comment: String::new(),
            };
            assert!(req.validate().is_err(), "{bad}");
        }
    }
}
