//! Lifecycle commands
//!
//! One module per command. Each action validates its preconditions against
//! the documents it reads through [`TxnContext`], mutates them, and returns
//! the events to broadcast after commit.
//!
//! [`TxnContext`]: super::command::TxnContext

pub mod cancel_order;
pub mod complete_order;
pub mod confirm_delivery;
pub mod confirm_payment;
pub mod escalate_dispute;
pub mod open_dispute;
pub mod reserve_listing;
pub mod ship_order;
pub mod submit_review;

pub use cancel_order::CancelOrderAction;
pub use complete_order::CompleteOrderAction;
pub use confirm_delivery::ConfirmDeliveryAction;
pub use confirm_payment::ConfirmPaymentAction;
pub use escalate_dispute::EscalateDisputeAction;
pub use open_dispute::OpenDisputeAction;
pub use reserve_listing::{RESERVATION_WINDOW_MS, ReserveListingAction};
pub use ship_order::ShipOrderAction;
pub use submit_review::SubmitReviewAction;
