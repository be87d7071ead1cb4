//! Server state
//!
//! `ServerState` holds shared references to every service; cloning it is a
//! handful of `Arc` bumps.

use std::sync::Arc;

use crate::auth::JwtService;
use crate::core::Config;
use crate::core::error::Result;
use crate::market::MarketManager;
use crate::services::{DisputeService, FsObjectStore, Notifier};

/// Shared server state injected into every handler
#[derive(Clone)]
pub struct ServerState {
    /// Immutable configuration
    pub config: Config,
    /// The order transaction engine
    pub market: Arc<MarketManager>,
    /// Dispute orchestration (uploads + transactional open)
    pub disputes: Arc<DisputeService>,
    /// JWT validation service
    pub jwt_service: Arc<JwtService>,
}

impl std::fmt::Debug for ServerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerState")
            .field("config", &self.config)
            .field("market", &self.market)
            .field("disputes", &"<DisputeService>")
            .finish()
    }
}

impl ServerState {
    /// Build the full service graph under the configured work directory
    pub async fn initialize(config: &Config) -> Result<Self> {
        tokio::fs::create_dir_all(&config.work_dir).await?;

        let db_path = std::path::Path::new(&config.work_dir).join("market.redb");
        let market = Arc::new(MarketManager::new(db_path)?);

        let evidence_dir = std::path::Path::new(&config.work_dir).join("evidence");
        let store = Arc::new(FsObjectStore::new(
            evidence_dir,
            config.evidence_base_url.clone(),
        ));
        let disputes = Arc::new(DisputeService::new(market.clone(), store));

        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));

        Ok(Self {
            config: config.clone(),
            market,
            disputes,
            jwt_service,
        })
    }

    /// Start long-lived background tasks (notification fan-out)
    pub fn start_background_tasks(&self) {
        Notifier::spawn(&self.market);
        tracing::info!("Background tasks started");
    }
}
