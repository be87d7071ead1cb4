//! CompleteOrder command handler
//!
//! Buyer confirms the transaction is done. Completion releases the seller
//! payout, which is the external collaborator's job: the command emits
//! `PayoutRequested` alongside `OrderCompleted`.

use async_trait::async_trait;

use crate::market::command::{Command, CommandMeta, TxnContext};
use crate::market::error::MarketError;
use crate::market::events::MarketEvent;
use crate::market::transitions::{self, OrderAction};

/// CompleteOrder action
#[derive(Debug, Clone)]
pub struct CompleteOrderAction {
    pub order_id: String,
}

#[async_trait]
impl Command for CompleteOrderAction {
    async fn execute(
        &self,
        ctx: &mut TxnContext<'_>,
        meta: &CommandMeta,
    ) -> Result<Vec<MarketEvent>, MarketError> {
        let mut order = ctx.order(&self.order_id)?;
        if meta.caller_id != order.buyer_id {
            return Err(MarketError::Unauthorized(
                "Only the buyer can complete this order".to_string(),
            ));
        }

        order.status = transitions::apply(order.status, OrderAction::Complete)?;
        order.buyer_confirmed_at = Some(meta.timestamp);
        ctx.put_order(&order)?;

        Ok(vec![
            MarketEvent::OrderCompleted {
                order_id: order.id.clone(),
                seller_id: order.seller_id.clone(),
            },
            MarketEvent::PayoutRequested {
                order_id: order.id,
                seller_id: order.seller_id,
                amount: order.price_paid,
            },
        ])
    }
}
