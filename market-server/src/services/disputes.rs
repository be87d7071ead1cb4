//! Dispute orchestration
//!
//! Sequencing per the dispute contract: upload every evidence image first,
//! then run the transactional OpenDispute command. A partial upload aborts
//! the whole operation before any document is written, so a failed call
//! leaves the order untouched and is safe to retry wholesale.

use std::sync::Arc;
use std::time::Duration;

use super::object_storage::ObjectStorage;
use crate::market::{CommandMeta, MarketError, MarketManager, MarketResult};
use shared::models::DisputeReason;

/// Bound on each evidence upload; a hung store fails the operation
/// cleanly instead of holding the request open
const UPLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// One evidence image as received from the client
#[derive(Debug, Clone)]
pub struct EvidenceFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Dispute subsystem entry point
pub struct DisputeService {
    market: Arc<MarketManager>,
    store: Arc<dyn ObjectStorage>,
}

impl DisputeService {
    pub fn new(market: Arc<MarketManager>, store: Arc<dyn ObjectStorage>) -> Self {
        Self { market, store }
    }

    /// Open a dispute against an order
    ///
    /// Any upload failure or timeout maps to `UploadFailed` and nothing
    /// is written.
    pub async fn open_dispute(
        &self,
        order_id: &str,
        reason: DisputeReason,
        description: &str,
        evidence: Vec<EvidenceFile>,
        meta: &CommandMeta,
    ) -> MarketResult<String> {
        let mut evidence_urls = Vec::with_capacity(evidence.len());
        for file in &evidence {
            let url = tokio::time::timeout(
                UPLOAD_TIMEOUT,
                self.store.upload(&file.file_name, &file.bytes),
            )
            .await
            .map_err(|_| MarketError::UploadFailed("upload timed out".to_string()))?
            .map_err(|e| MarketError::UploadFailed(e.to_string()))?;
            evidence_urls.push(url);
        }

        self.market
            .open_dispute(order_id, reason, description, evidence_urls, meta)
            .await
    }

    /// Escalate an open dispute to human support (idempotent)
    pub async fn escalate(&self, dispute_id: &str, meta: &CommandMeta) -> MarketResult<()> {
        self.market.escalate_dispute(dispute_id, meta).await
    }
}
