//! Dispute API Handlers
//!
//! Evidence images arrive base64-encoded; they are decoded here and
//! uploaded by the dispute service before anything is written.

use axum::{
    Json,
    extract::{Path, State},
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::api::command_meta;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::services::EvidenceFile;
use crate::utils::{AppError, AppResult};
use shared::models::{Dispute, DisputeReason};

/// One base64-encoded evidence image
#[derive(Debug, Deserialize, Serialize)]
pub struct EvidencePayload {
    pub file_name: String,
    pub data_base64: String,
}

/// Open dispute request
#[derive(Debug, Deserialize, Validate)]
pub struct OpenDisputeRequest {
    pub order_id: String,
    pub reason: DisputeReason,
    #[validate(length(min = 1, max = 4000))]
    pub description: String,
    #[validate(length(max = 10))]
    #[serde(default)]
    pub evidence: Vec<EvidencePayload>,
}

#[derive(Debug, Serialize)]
pub struct OpenDisputeResponse {
    pub dispute_id: String,
}

/// Open a dispute against an order
pub async fn open(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<OpenDisputeRequest>,
) -> AppResult<Json<OpenDisputeResponse>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let mut evidence = Vec::with_capacity(payload.evidence.len());
    for item in &payload.evidence {
        let bytes = BASE64
            .decode(item.data_base64.as_bytes())
            .map_err(|_| AppError::validation(format!("Invalid base64 in {}", item.file_name)))?;
        evidence.push(EvidenceFile {
            file_name: item.file_name.clone(),
            bytes,
        });
    }

    let dispute_id = state
        .disputes
        .open_dispute(
            &payload.order_id,
            payload.reason,
            &payload.description,
            evidence,
            &command_meta(&user),
        )
        .await?;
    Ok(Json(OpenDisputeResponse { dispute_id }))
}

/// Get dispute by id (parties and support only)
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<Dispute>> {
    let dispute = state.market.get_dispute(&id)?;
    if user.id != dispute.buyer_id && user.id != dispute.seller_id && !user.is_support() {
        return Err(AppError::forbidden("Not a party to this dispute"));
    }
    Ok(Json(dispute))
}

/// Escalate a dispute to human support (idempotent)
pub async fn escalate(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<Dispute>> {
    state.disputes.escalate(&id, &command_meta(&user)).await?;
    Ok(Json(state.market.get_dispute(&id)?))
}
