//! Notification fan-out
//!
//! Subscribes the manager's event channel and dispatches each committed
//! transition as an at-most-once, best-effort notification. Delivery here
//! is a structured log line; a push transport would hang off the same
//! loop. Lag or loss never propagates back to the engine.

use dashmap::DashMap;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use crate::market::{MarketEvent, MarketManager};

/// Per-resource notification version counters
///
/// Monotonically increasing per resource family so consumers can order
/// notifications without timestamps.
#[derive(Debug, Default)]
pub struct ResourceVersions {
    versions: DashMap<String, u64>,
}

impl ResourceVersions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment the version for a resource and return the new value
    pub fn increment(&self, resource: &str) -> u64 {
        let mut entry = self.versions.entry(resource.to_string()).or_insert(0);
        *entry += 1;
        *entry
    }

    /// Current version for a resource (0 if never notified)
    pub fn get(&self, resource: &str) -> u64 {
        self.versions.get(resource).map(|v| *v).unwrap_or(0)
    }
}

/// Best-effort notification dispatcher
#[derive(Debug, Default)]
pub struct Notifier {
    versions: ResourceVersions,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispatch one event; returns the notification version assigned
    pub fn deliver(&self, event: &MarketEvent) -> u64 {
        let version = self.versions.increment(event.resource());
        tracing::info!(
            target: "notify",
            resource = event.resource(),
            kind = event.kind(),
            version,
            "notification dispatched"
        );
        version
    }

    /// Run the fan-out loop until the engine shuts down
    pub fn spawn(manager: &MarketManager) -> JoinHandle<()> {
        let mut rx = manager.subscribe();
        let notifier = Notifier::new();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => {
                        notifier.deliver(&event);
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "notification stream lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }
}
