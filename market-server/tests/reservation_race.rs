//! Concurrent reservation tests
//!
//! The no-double-sale property: for any number of racing `reserve` calls
//! on the same available listing, exactly one succeeds and every other
//! caller observes `AlreadyReserved` (or `AlreadySold` once paid).

use std::sync::Arc;

use market_server::market::{CommandMeta, MarketError, MarketManager};
use shared::models::{
    Condition, DeliveryMethod, ListingDraft, ListingStatus, OrderDraft, OrderStatus,
};

const NOW: i64 = 1_700_000_000_000;

fn published_listing(mgr: &MarketManager) -> String {
    let seller = CommandMeta::user("seller-1", NOW);
    mgr.publish_listing(
        ListingDraft {
            title: "Game console".to_string(),
            description: String::new(),
            price: 120.0,
            condition: Condition::Good,
            category: "gaming".to_string(),
            postal_code: "28013".to_string(),
            image_urls: vec![],
        },
        &seller,
    )
    .unwrap()
    .id
}

fn pickup() -> OrderDraft {
    OrderDraft {
        delivery_method: DeliveryMethod::Pickup,
        shipping_address: None,
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_two_buyers_same_instant() {
    let dir = tempfile::tempdir().unwrap();
    let mgr = Arc::new(MarketManager::new(dir.path().join("market.redb")).unwrap());
    let listing_id = published_listing(&mgr);

    let tasks: Vec<_> = ["buyer-1", "buyer-2"]
        .into_iter()
        .map(|buyer| {
            let mgr = mgr.clone();
            let listing_id = listing_id.clone();
            let meta = CommandMeta::user(buyer, NOW);
            tokio::spawn(async move { mgr.reserve_listing(&listing_id, pickup(), &meta).await })
        })
        .collect();

    let mut winners = 0;
    let mut rejected = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => winners += 1,
            Err(MarketError::AlreadyReserved(_)) => rejected += 1,
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    assert_eq!(winners, 1);
    assert_eq!(rejected, 1);
    assert_eq!(
        mgr.get_listing(&listing_id).unwrap().status,
        ListingStatus::Reserved
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_many_buyers_one_winner() {
    let dir = tempfile::tempdir().unwrap();
    let mgr = Arc::new(MarketManager::new(dir.path().join("market.redb")).unwrap());
    let listing_id = published_listing(&mgr);

    let tasks: Vec<_> = (0..16)
        .map(|i| {
            let mgr = mgr.clone();
            let listing_id = listing_id.clone();
            let meta = CommandMeta::user(format!("buyer-{i}"), NOW);
            tokio::spawn(async move {
                // Jitter arrival order so the winner varies between runs
                let jitter = rand::random::<u64>() % 5;
                tokio::time::sleep(std::time::Duration::from_millis(jitter)).await;
                mgr.reserve_listing(&listing_id, pickup(), &meta).await
            })
        })
        .collect();

    let mut order_ids = Vec::new();
    for task in tasks {
        if let Ok(order_id) = task.await.unwrap() {
            order_ids.push(order_id);
        }
    }

    // Exactly one order was created and it holds the reservation
    assert_eq!(order_ids.len(), 1);
    let listing = mgr.get_listing(&listing_id).unwrap();
    assert_eq!(listing.status, ListingStatus::Reserved);
    assert_eq!(listing.reserved_by_order.as_deref(), Some(order_ids[0].as_str()));
    assert_eq!(
        mgr.get_order(&order_ids[0]).unwrap().status,
        OrderStatus::PendingPayment
    );
}

/// After payment, late arrivals observe AlreadySold rather than
/// AlreadyReserved.
#[tokio::test]
async fn test_late_buyer_sees_already_sold() {
    let dir = tempfile::tempdir().unwrap();
    let mgr = Arc::new(MarketManager::new(dir.path().join("market.redb")).unwrap());
    let listing_id = published_listing(&mgr);

    let buyer = CommandMeta::user("buyer-1", NOW);
    let order_id = mgr
        .reserve_listing(&listing_id, pickup(), &buyer)
        .await
        .unwrap();
    mgr.confirm_payment(&order_id, &buyer).await.unwrap();

    // Even far in the future, a sold listing never becomes reservable
    let late = CommandMeta::user("buyer-2", NOW + 10 * 24 * 3_600_000);
    assert!(matches!(
        mgr.reserve_listing(&listing_id, pickup(), &late).await,
        Err(MarketError::AlreadySold(_))
    ));
}

/// Concurrent review submissions to the same seller serialize; the final
/// average is the arithmetic mean of all ratings and review_count == N.
#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_reviews_do_not_lose_updates() {
    let dir = tempfile::tempdir().unwrap();
    let mgr = Arc::new(MarketManager::new(dir.path().join("market.redb")).unwrap());

    let seller = CommandMeta::user("seller-1", NOW);
    let ratings: Vec<u8> = vec![5, 4, 3, 2, 1, 5, 4, 3];

    // One completed order per future reviewer
    let mut orders = Vec::new();
    for (i, _) in ratings.iter().enumerate() {
        let listing = mgr
            .publish_listing(
                ListingDraft {
                    title: format!("Item {i}"),
                    description: String::new(),
                    price: 10.0,
                    condition: Condition::Fair,
                    category: "misc".to_string(),
                    postal_code: "28013".to_string(),
                    image_urls: vec![],
                },
                &seller,
            )
            .unwrap();
        let buyer = CommandMeta::user(format!("buyer-{i}"), NOW + 1_000);
        let order_id = mgr
            .reserve_listing(&listing.id, pickup(), &buyer)
            .await
            .unwrap();
        mgr.confirm_payment(&order_id, &buyer).await.unwrap();
        mgr.ship_order(&order_id, "TRK", &seller).await.unwrap();
        mgr.complete_order(&order_id, &buyer).await.unwrap();
        orders.push(order_id);
    }

    let tasks: Vec<_> = orders
        .iter()
        .zip(ratings.iter())
        .enumerate()
        .map(|(i, (order_id, rating))| {
            let mgr = mgr.clone();
            let order_id = order_id.clone();
            let rating = *rating;
            let meta = CommandMeta::user(format!("buyer-{i}"), NOW + 2_000);
            tokio::spawn(async move { mgr.submit_review(&order_id, rating, "", &meta).await })
        })
        .collect();

    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let aggregate = mgr.seller_rating("seller-1").unwrap();
    assert_eq!(aggregate.review_count, ratings.len() as u32);
    let expected = ratings.iter().map(|r| *r as f64).sum::<f64>() / ratings.len() as f64;
    assert!((aggregate.rating - expected).abs() < 1e-9);
}
