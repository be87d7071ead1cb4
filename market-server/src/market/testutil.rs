//! Shared fixtures for engine tests

use super::actions::{ConfirmPaymentAction, ReserveListingAction, ShipOrderAction};
use super::command::{Command, CommandMeta, TxnContext};
use shared::models::{Condition, DeliveryMethod, Listing, ListingStatus, OrderDraft};

/// Fixed "now" used across engine tests (Unix millis)
pub const NOW: i64 = 1_700_000_000_000;

pub fn listing_fixture(id: &str, seller: &str) -> Listing {
    Listing {
        id: id.to_string(),
        seller_id: seller.to_string(),
        title: "Road bike".to_string(),
        description: "Barely used".to_string(),
        price: 25.0,
        condition: Condition::LikeNew,
        category: "sports".to_string(),
        postal_code: "28013".to_string(),
        image_urls: vec!["https://img.example/bike.jpg".to_string()],
        status: ListingStatus::Available,
        reserved_until: None,
        reserved_by_order: None,
        is_boosted: false,
        boost_type: None,
        boost_ends: None,
        created_at: NOW - 86_400_000,
    }
}

pub fn pickup_draft() -> OrderDraft {
    OrderDraft {
        delivery_method: DeliveryMethod::Pickup,
        shipping_address: None,
    }
}

/// Seed a listing owned by `seller-1` and reserve it for `buyer`
pub async fn reserve_fixture(
    ctx: &mut TxnContext<'_>,
    listing_id: &str,
    order_id: &str,
    buyer: &str,
) {
    ctx.put_listing(&listing_fixture(listing_id, "seller-1"))
        .unwrap();
    ReserveListingAction {
        listing_id: listing_id.to_string(),
        order_id: order_id.to_string(),
        draft: pickup_draft(),
    }
    .execute(ctx, &CommandMeta::user(buyer, NOW))
    .await
    .unwrap();
}

/// Reserve and confirm payment: order ends PAID_PENDING_SHIPMENT
pub async fn paid_fixture(
    ctx: &mut TxnContext<'_>,
    listing_id: &str,
    order_id: &str,
    buyer: &str,
) {
    reserve_fixture(ctx, listing_id, order_id, buyer).await;
    ConfirmPaymentAction {
        order_id: order_id.to_string(),
    }
    .execute(ctx, &CommandMeta::user(buyer, NOW + 60_000))
    .await
    .unwrap();
}

/// Reserve, pay and ship: order ends SHIPPED with tracking set
pub async fn shipped_fixture(
    ctx: &mut TxnContext<'_>,
    listing_id: &str,
    order_id: &str,
    buyer: &str,
) {
    paid_fixture(ctx, listing_id, order_id, buyer).await;
    ShipOrderAction {
        order_id: order_id.to_string(),
        tracking_number: "AB123".to_string(),
    }
    .execute(ctx, &CommandMeta::user("seller-1", NOW + 120_000))
    .await
    .unwrap();
}
