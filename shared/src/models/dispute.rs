//! Dispute Model

use serde::{Deserialize, Serialize};

/// Dispute status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DisputeStatus {
    #[default]
    Open,
    EscalatedToAdmin,
}

/// Why the buyer opened the dispute
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DisputeReason {
    NotReceived,
    NotAsDescribed,
    Damaged,
    CounterfeitSuspicion,
    Other,
}

/// Dispute entity
///
/// At most one dispute exists per order; the engine enforces this with a
/// per-order index written in the same transaction as the dispute.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dispute {
    pub id: String,
    pub order_id: String,
    pub listing_id: String,
    pub buyer_id: String,
    pub seller_id: String,
    pub reason: DisputeReason,
    pub description: String,
    pub evidence_urls: Vec<String>,
    pub status: DisputeStatus,
    /// Creation time (Unix millis)
    pub created_at: i64,
    pub escalated_at: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serde_rename() {
        let json = serde_json::to_string(&DisputeStatus::EscalatedToAdmin).unwrap();
        assert_eq!(json, "\"ESCALATED_TO_ADMIN\"");
    }
}
