//! End-to-end order lifecycle tests against the manager API
//!
//! These drive the engine exactly as the HTTP handlers do: authenticated
//! metadata in, committed documents and events out.

use std::sync::Arc;

use market_server::market::actions::RESERVATION_WINDOW_MS;
use market_server::market::{CancelReason, CommandMeta, MarketError, MarketEvent, MarketManager};
use market_server::services::{DisputeService, EvidenceFile, ObjectStorage, ObjectStorageError};
use async_trait::async_trait;
use shared::models::{
    Condition, DeliveryMethod, DisputeReason, DisputeStatus, ListingDraft, ListingStatus,
    OrderDraft, OrderStatus, PaymentStatus,
};

const NOW: i64 = 1_700_000_000_000;

fn manager() -> (Arc<MarketManager>, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let mgr = MarketManager::new(dir.path().join("market.redb")).unwrap();
    (Arc::new(mgr), dir)
}

fn draft(price: f64) -> ListingDraft {
    ListingDraft {
        title: "Vintage camera".to_string(),
        description: "Fully working".to_string(),
        price,
        condition: Condition::Good,
        category: "photo".to_string(),
        postal_code: "28013".to_string(),
        image_urls: vec!["https://img.example/camera.jpg".to_string()],
    }
}

fn pickup() -> OrderDraft {
    OrderDraft {
        delivery_method: DeliveryMethod::Pickup,
        shipping_address: None,
    }
}

/// Listing priced 25.00 goes reserve → paid → shipped → completed; the
/// listing ends SOLD and both fulfillment timestamps are populated.
#[tokio::test]
async fn test_full_happy_path() {
    let (mgr, _dir) = manager();

    let seller = CommandMeta::user("seller-1", NOW);
    let listing = mgr.publish_listing(draft(25.0), &seller).unwrap();

    let buyer = CommandMeta::user("buyer-1", NOW + 1_000);
    let order_id = mgr
        .reserve_listing(&listing.id, pickup(), &buyer)
        .await
        .unwrap();
    assert_eq!(
        mgr.get_order(&order_id).unwrap().status,
        OrderStatus::PendingPayment
    );
    assert_eq!(
        mgr.get_listing(&listing.id).unwrap().status,
        ListingStatus::Reserved
    );

    mgr.confirm_payment(&order_id, &CommandMeta::user("buyer-1", NOW + 2_000))
        .await
        .unwrap();
    let order = mgr.get_order(&order_id).unwrap();
    assert_eq!(order.status, OrderStatus::PaidPendingShipment);
    assert_eq!(order.payment_status, PaymentStatus::Paid);
    assert_eq!(
        mgr.get_listing(&listing.id).unwrap().status,
        ListingStatus::Sold
    );

    mgr.ship_order(&order_id, "AB123", &CommandMeta::user("seller-1", NOW + 3_000))
        .await
        .unwrap();
    let order = mgr.get_order(&order_id).unwrap();
    assert_eq!(order.status, OrderStatus::Shipped);
    assert_eq!(order.tracking_number.as_deref(), Some("AB123"));
    assert_eq!(order.shipped_at, Some(NOW + 3_000));

    mgr.complete_order(&order_id, &CommandMeta::user("buyer-1", NOW + 4_000))
        .await
        .unwrap();
    let order = mgr.get_order(&order_id).unwrap();
    assert_eq!(order.status, OrderStatus::Completed);
    assert_eq!(order.buyer_confirmed_at, Some(NOW + 4_000));
    assert_eq!(order.price_paid, 25.0);

    // Final listing state
    assert_eq!(
        mgr.get_listing(&listing.id).unwrap().status,
        ListingStatus::Sold
    );
}

/// The sequence of statuses an order goes through is observable via the
/// event channel and never leaves the transition graph.
#[tokio::test]
async fn test_event_sequence_for_happy_path() {
    let (mgr, _dir) = manager();
    let mut rx = mgr.subscribe();

    let seller = CommandMeta::user("seller-1", NOW);
    let listing = mgr.publish_listing(draft(25.0), &seller).unwrap();
    let buyer = CommandMeta::user("buyer-1", NOW + 1_000);
    let order_id = mgr
        .reserve_listing(&listing.id, pickup(), &buyer)
        .await
        .unwrap();
    mgr.confirm_payment(&order_id, &buyer).await.unwrap();
    mgr.ship_order(&order_id, "AB123", &seller).await.unwrap();
    mgr.confirm_delivery(&order_id, &buyer).await.unwrap();
    mgr.complete_order(&order_id, &buyer).await.unwrap();

    let mut kinds = Vec::new();
    while let Ok(event) = rx.try_recv() {
        kinds.push(event.kind());
    }
    assert_eq!(
        kinds,
        vec![
            "listing_published",
            "order_reserved",
            "payment_confirmed",
            "order_shipped",
            "order_delivered",
            "order_completed",
            "payout_requested",
        ]
    );
}

/// A reserved listing becomes reservable again once the window elapses,
/// with no explicit cancellation call.
#[tokio::test]
async fn test_reservation_expiry_allows_second_buyer() {
    let (mgr, _dir) = manager();

    let seller = CommandMeta::user("seller-1", NOW);
    let listing = mgr.publish_listing(draft(25.0), &seller).unwrap();

    let first = CommandMeta::user("buyer-1", NOW);
    let first_order = mgr
        .reserve_listing(&listing.id, pickup(), &first)
        .await
        .unwrap();

    // Inside the window: blocked
    let blocked = CommandMeta::user("buyer-2", NOW + RESERVATION_WINDOW_MS - 1);
    assert!(matches!(
        mgr.reserve_listing(&listing.id, pickup(), &blocked).await,
        Err(MarketError::AlreadyReserved(_))
    ));

    // After the window: the takeover succeeds and the stale order is
    // implicitly cancelled
    let second = CommandMeta::user("buyer-2", NOW + RESERVATION_WINDOW_MS + 1);
    let second_order = mgr
        .reserve_listing(&listing.id, pickup(), &second)
        .await
        .unwrap();

    assert_eq!(
        mgr.get_order(&first_order).unwrap().status,
        OrderStatus::Cancelled
    );
    assert_eq!(
        mgr.get_order(&second_order).unwrap().status,
        OrderStatus::PendingPayment
    );
    let listing = mgr.get_listing(&listing.id).unwrap();
    assert_eq!(listing.reserved_by_order, Some(second_order));
}

/// Payment failure cancels the order and releases the listing.
#[tokio::test]
async fn test_payment_failure_releases_listing() {
    let (mgr, _dir) = manager();

    let seller = CommandMeta::user("seller-1", NOW);
    let listing = mgr.publish_listing(draft(25.0), &seller).unwrap();
    let buyer = CommandMeta::user("buyer-1", NOW + 1_000);
    let order_id = mgr
        .reserve_listing(&listing.id, pickup(), &buyer)
        .await
        .unwrap();

    mgr.cancel_order(&order_id, CancelReason::PaymentFailed, &buyer)
        .await
        .unwrap();

    let order = mgr.get_order(&order_id).unwrap();
    assert_eq!(order.status, OrderStatus::Cancelled);
    assert_eq!(order.payment_status, PaymentStatus::Failed);

    let listing = mgr.get_listing(&listing.id).unwrap();
    assert_eq!(listing.status, ListingStatus::Available);
    assert!(listing.reserved_until.is_none());
}

/// A disputed order is frozen: no fulfillment transition is accepted.
#[tokio::test]
async fn test_dispute_freezes_order() {
    let (mgr, _dir) = manager();

    let seller = CommandMeta::user("seller-1", NOW);
    let listing = mgr.publish_listing(draft(25.0), &seller).unwrap();
    let buyer = CommandMeta::user("buyer-1", NOW + 1_000);
    let order_id = mgr
        .reserve_listing(&listing.id, pickup(), &buyer)
        .await
        .unwrap();
    mgr.confirm_payment(&order_id, &buyer).await.unwrap();
    mgr.ship_order(&order_id, "AB123", &seller).await.unwrap();

    let dispute_id = mgr
        .open_dispute(
            &order_id,
            DisputeReason::NotAsDescribed,
            "Lens is scratched",
            vec!["https://cdn.example/ev1.jpg".to_string()],
            &buyer,
        )
        .await
        .unwrap();
    assert_eq!(
        mgr.get_order(&order_id).unwrap().status,
        OrderStatus::Disputed
    );

    // Neither party can move the order any more
    assert!(matches!(
        mgr.confirm_delivery(&order_id, &buyer).await,
        Err(MarketError::InvalidStateTransition { .. })
    ));
    assert!(matches!(
        mgr.complete_order(&order_id, &buyer).await,
        Err(MarketError::InvalidStateTransition { .. })
    ));

    // Escalation works and is idempotent
    mgr.escalate_dispute(&dispute_id, &buyer).await.unwrap();
    mgr.escalate_dispute(&dispute_id, &buyer).await.unwrap();
    let dispute = mgr.get_dispute(&dispute_id).unwrap();
    assert_eq!(dispute.status, DisputeStatus::EscalatedToAdmin);
    assert!(dispute.escalated_at.is_some());
}

/// Object store that fails after N successful uploads.
struct FailingStore {
    allow: usize,
    calls: std::sync::atomic::AtomicUsize,
}

#[async_trait]
impl ObjectStorage for FailingStore {
    async fn upload(&self, _name: &str, _bytes: &[u8]) -> Result<String, ObjectStorageError> {
        let n = self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        if n < self.allow {
            Ok(format!("https://cdn.example/{n}.jpg"))
        } else {
            Err(ObjectStorageError::Rejected("storage down".to_string()))
        }
    }
}

/// If any evidence upload fails, no dispute exists afterwards and the
/// order status is unchanged.
#[tokio::test]
async fn test_dispute_evidence_atomicity() {
    let (mgr, _dir) = manager();

    let seller = CommandMeta::user("seller-1", NOW);
    let listing = mgr.publish_listing(draft(25.0), &seller).unwrap();
    let buyer = CommandMeta::user("buyer-1", NOW + 1_000);
    let order_id = mgr
        .reserve_listing(&listing.id, pickup(), &buyer)
        .await
        .unwrap();
    mgr.confirm_payment(&order_id, &buyer).await.unwrap();
    mgr.ship_order(&order_id, "AB123", &seller).await.unwrap();

    let service = DisputeService::new(
        mgr.clone(),
        Arc::new(FailingStore {
            allow: 2,
            calls: std::sync::atomic::AtomicUsize::new(0),
        }),
    );

    let evidence: Vec<EvidenceFile> = (0..3)
        .map(|i| EvidenceFile {
            file_name: format!("ev{i}.jpg"),
            bytes: vec![0xFF, 0xD8, i as u8],
        })
        .collect();

    let result = service
        .open_dispute(
            &order_id,
            DisputeReason::Damaged,
            "Arrived broken",
            evidence,
            &buyer,
        )
        .await;
    assert!(matches!(result, Err(MarketError::UploadFailed(_))));

    // Order untouched; the retry succeeds wholesale
    assert_eq!(
        mgr.get_order(&order_id).unwrap().status,
        OrderStatus::Shipped
    );

    let retry_service = DisputeService::new(
        mgr.clone(),
        Arc::new(FailingStore {
            allow: usize::MAX,
            calls: std::sync::atomic::AtomicUsize::new(0),
        }),
    );
    let evidence: Vec<EvidenceFile> = (0..3)
        .map(|i| EvidenceFile {
            file_name: format!("ev{i}.jpg"),
            bytes: vec![0xFF, 0xD8, i as u8],
        })
        .collect();
    let dispute_id = retry_service
        .open_dispute(
            &order_id,
            DisputeReason::Damaged,
            "Arrived broken",
            evidence,
            &buyer,
        )
        .await
        .unwrap();
    assert_eq!(mgr.get_dispute(&dispute_id).unwrap().evidence_urls.len(), 3);
}

/// Ratings to different targets stay independent; a second rating on the
/// first target averages with the first; `review_count` tracks N.
#[tokio::test]
async fn test_rating_aggregates_per_target() {
    let (mgr, _dir) = manager();

    // Two sellers, three orders
    let seller_a = CommandMeta::user("seller-a", NOW);
    let seller_b = CommandMeta::user("seller-b", NOW);
    let listing_a1 = mgr.publish_listing(draft(10.0), &seller_a).unwrap();
    let listing_a2 = mgr.publish_listing(draft(12.0), &seller_a).unwrap();
    let listing_b = mgr.publish_listing(draft(15.0), &seller_b).unwrap();

    async fn completed_order(
        mgr: &Arc<MarketManager>,
        listing_id: &str,
        seller: &str,
        buyer: &str,
    ) -> String {
        let buyer_meta = CommandMeta::user(buyer, NOW + 1_000);
        let order_id = mgr
            .reserve_listing(
                listing_id,
                OrderDraft {
                    delivery_method: DeliveryMethod::Pickup,
                    shipping_address: None,
                },
                &buyer_meta,
            )
            .await
            .unwrap();
        mgr.confirm_payment(&order_id, &buyer_meta).await.unwrap();
        mgr.ship_order(&order_id, "TRK", &CommandMeta::user(seller, NOW + 2_000))
            .await
            .unwrap();
        mgr.complete_order(&order_id, &buyer_meta).await.unwrap();
        order_id
    }

    let order_a1 = completed_order(&mgr, &listing_a1.id, "seller-a", "buyer-1").await;
    let order_b = completed_order(&mgr, &listing_b.id, "seller-b", "buyer-1").await;
    let order_a2 = completed_order(&mgr, &listing_a2.id, "seller-a", "buyer-2").await;

    // buyer-1 rates seller-a 4 and seller-b 2
    let buyer1 = CommandMeta::user("buyer-1", NOW + 5_000);
    mgr.submit_review(&order_a1, 4, "good", &buyer1).await.unwrap();
    mgr.submit_review(&order_b, 2, "meh", &buyer1).await.unwrap();

    assert_eq!(mgr.seller_rating("seller-a").unwrap().rating, 4.0);
    assert_eq!(mgr.seller_rating("seller-b").unwrap().rating, 2.0);

    // A different buyer rates seller-a 5: average (4+5)/2 = 4.5
    let buyer2 = CommandMeta::user("buyer-2", NOW + 6_000);
    mgr.submit_review(&order_a2, 5, "great", &buyer2).await.unwrap();

    let aggregate = mgr.seller_rating("seller-a").unwrap();
    assert_eq!(aggregate.rating, 4.5);
    assert_eq!(aggregate.review_count, 2);
    assert_eq!(mgr.seller_rating("seller-b").unwrap().review_count, 1);

    // Double review fails and leaves the aggregate alone
    assert!(matches!(
        mgr.submit_review(&order_a1, 1, "again", &buyer1).await,
        Err(MarketError::AlreadyReviewed(_))
    ));
    assert_eq!(mgr.seller_rating("seller-a").unwrap().rating, 4.5);
}

/// Review events carry the updated aggregate.
#[tokio::test]
async fn test_review_event_carries_new_aggregate() {
    let (mgr, _dir) = manager();

    let seller = CommandMeta::user("seller-1", NOW);
    let listing = mgr.publish_listing(draft(20.0), &seller).unwrap();
    let buyer = CommandMeta::user("buyer-1", NOW + 1_000);
    let order_id = mgr
        .reserve_listing(&listing.id, pickup(), &buyer)
        .await
        .unwrap();
    mgr.confirm_payment(&order_id, &buyer).await.unwrap();
    mgr.ship_order(&order_id, "TRK", &seller).await.unwrap();
    mgr.complete_order(&order_id, &buyer).await.unwrap();

    let mut rx = mgr.subscribe();
    mgr.submit_review(&order_id, 3, "fine", &buyer).await.unwrap();

    let mut saw_review_event = false;
    while let Ok(event) = rx.try_recv() {
        if let MarketEvent::ReviewSubmitted {
            rating,
            review_count,
            target_user_id,
            ..
        } = event
        {
            assert_eq!(rating, 3.0);
            assert_eq!(review_count, 1);
            assert_eq!(target_user_id, "seller-1");
            saw_review_event = true;
        }
    }
    assert!(saw_review_event);
}
