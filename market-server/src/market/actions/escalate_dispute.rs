//! EscalateDispute command handler
//!
//! Hands an open dispute to human support. Idempotent: escalating an
//! already-escalated dispute is a no-op, not an error.

use async_trait::async_trait;

use crate::market::command::{Command, CommandMeta, TxnContext};
use crate::market::error::MarketError;
use crate::market::events::MarketEvent;
use shared::models::DisputeStatus;

/// EscalateDispute action
#[derive(Debug, Clone)]
pub struct EscalateDisputeAction {
    pub dispute_id: String,
}

#[async_trait]
impl Command for EscalateDisputeAction {
    async fn execute(
        &self,
        ctx: &mut TxnContext<'_>,
        meta: &CommandMeta,
    ) -> Result<Vec<MarketEvent>, MarketError> {
        let mut dispute = ctx.dispute(&self.dispute_id)?;
        if meta.caller_id != dispute.buyer_id && !meta.support {
            return Err(MarketError::Unauthorized(
                "Only the dispute owner or support can escalate".to_string(),
            ));
        }

        if dispute.status == DisputeStatus::EscalatedToAdmin {
            return Ok(vec![]);
        }

        dispute.status = DisputeStatus::EscalatedToAdmin;
        dispute.escalated_at = Some(meta.timestamp);
        ctx.put_dispute(&dispute)?;

        Ok(vec![MarketEvent::DisputeEscalated {
            dispute_id: dispute.id,
            order_id: dispute.order_id,
        }])
    }
}
