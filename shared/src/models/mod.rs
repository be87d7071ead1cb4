//! Document models
//!
//! Serde structs for the persisted records (Listing, Order, Dispute,
//! Review, SellerRating) and their status enums. Timestamps are Unix
//! millis, money is in currency units.

pub mod dispute;
pub mod listing;
pub mod order;
pub mod review;
pub mod user;

pub use dispute::{Dispute, DisputeReason, DisputeStatus};
pub use listing::{BoostType, Condition, Listing, ListingDraft, ListingStatus};
pub use order::{
    DeliveryMethod, Order, OrderDraft, OrderStatus, PaymentStatus, ShippingAddress,
};
pub use review::Review;
pub use user::SellerRating;
