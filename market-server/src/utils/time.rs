//! Time helpers
//!
//! The engine never reads the clock; handlers stamp requests here and pass
//! the value down through `CommandMeta`.

/// Current time as Unix millis
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
