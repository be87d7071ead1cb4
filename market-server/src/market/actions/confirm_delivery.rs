//! ConfirmDelivery command handler
//!
//! Buyer confirms the item arrived.

use async_trait::async_trait;

use crate::market::command::{Command, CommandMeta, TxnContext};
use crate::market::error::MarketError;
use crate::market::events::MarketEvent;
use crate::market::transitions::{self, OrderAction};

/// ConfirmDelivery action
#[derive(Debug, Clone)]
pub struct ConfirmDeliveryAction {
    pub order_id: String,
}

#[async_trait]
impl Command for ConfirmDeliveryAction {
    async fn execute(
        &self,
        ctx: &mut TxnContext<'_>,
        meta: &CommandMeta,
    ) -> Result<Vec<MarketEvent>, MarketError> {
        let mut order = ctx.order(&self.order_id)?;
        if meta.caller_id != order.buyer_id {
            return Err(MarketError::Unauthorized(
                "Only the buyer can confirm delivery".to_string(),
            ));
        }

        order.status = transitions::apply(order.status, OrderAction::ConfirmDelivery)?;
        order.delivered_at = Some(meta.timestamp);
        ctx.put_order(&order)?;

        Ok(vec![MarketEvent::OrderDelivered {
            order_id: order.id,
            seller_id: order.seller_id,
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::storage::MarketStorage;
    use crate::market::testutil::{NOW, paid_fixture, shipped_fixture};
    use shared::models::OrderStatus;

    #[tokio::test]
    async fn test_confirm_delivery() {
        let storage = MarketStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        let mut ctx = TxnContext::new(&txn);
        shipped_fixture(&mut ctx, "listing-1", "order-1", "buyer-1").await;

        let events = ConfirmDeliveryAction {
            order_id: "order-1".to_string(),
        }
        .execute(&mut ctx, &CommandMeta::user("buyer-1", NOW + 200_000))
        .await
        .unwrap();

        assert!(matches!(events[0], MarketEvent::OrderDelivered { .. }));

        let order = ctx.order("order-1").unwrap();
        assert_eq!(order.status, OrderStatus::Delivered);
        assert_eq!(order.delivered_at, Some(NOW + 200_000));
    }

    #[tokio::test]
    async fn test_confirm_before_shipment_fails() {
        let storage = MarketStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        let mut ctx = TxnContext::new(&txn);
        paid_fixture(&mut ctx, "listing-1", "order-1", "buyer-1").await;

        let result = ConfirmDeliveryAction {
            order_id: "order-1".to_string(),
        }
        .execute(&mut ctx, &CommandMeta::user("buyer-1", NOW + 200_000))
        .await;
        assert!(matches!(
            result,
            Err(MarketError::InvalidStateTransition { .. })
        ));
    }

    #[tokio::test]
    async fn test_seller_cannot_confirm_delivery() {
        let storage = MarketStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        let mut ctx = TxnContext::new(&txn);
        shipped_fixture(&mut ctx, "listing-1", "order-1", "buyer-1").await;

        let result = ConfirmDeliveryAction {
            order_id: "order-1".to_string(),
        }
        .execute(&mut ctx, &CommandMeta::user("seller-1", NOW + 200_000))
        .await;
        assert!(matches!(result, Err(MarketError::Unauthorized(_))));
    }
}
