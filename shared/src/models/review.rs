//! Review Model

use serde::{Deserialize, Serialize};

/// Review entity
///
/// One per (order, buyer); immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: String,
    pub order_id: String,
    pub source_user_id: String,
    pub target_user_id: String,
    /// Integer rating in [1, 5]
    pub rating: u8,
    pub comment: String,
    /// Creation time (Unix millis)
    pub created_at: i64,
}
