//! Market Server - marketplace order transaction engine
//!
//! The server is a thin HTTP boundary over the order transaction engine:
//!
//! - **market**: listing reservation, fulfillment state machine, disputes
//!   and the seller-rating aggregate, all executed as single redb write
//!   transactions
//! - **services**: collaborator seams (object storage, dispute
//!   orchestration, notification fan-out)
//! - **auth**: JWT validation and the `CurrentUser` extractor
//! - **api**: axum routes and handlers
//! - **core**: configuration, state, server lifecycle
//!
//! # Module structure
//!
//! ```text
//! market-server/src/
//! ├── core/          # Config, state, server
//! ├── auth/          # JWT boundary
//! ├── market/        # The transaction engine
//! ├── services/      # Collaborators
//! ├── api/           # HTTP routes and handlers
//! └── utils/         # Logger, time helpers
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod market;
pub mod services;
pub mod utils;

// Re-export public types
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use market::{CommandMeta, MarketError, MarketEvent, MarketManager};
pub use utils::{ApiResponse, AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// Load .env, create the work directory and initialize logging
pub fn setup_environment() -> std::io::Result<()> {
    dotenv::dotenv().ok();

    let work_dir = std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/market-server".into());
    std::fs::create_dir_all(&work_dir)?;

    let log_dir = std::path::Path::new(&work_dir).join("logs");
    std::fs::create_dir_all(&log_dir)?;
    init_logger_with_file(
        std::env::var("LOG_LEVEL").ok().as_deref(),
        log_dir.to_str(),
    );

    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
   __  ___         __       __
  /  |/  /__ _____/ /_____ / /_
 / /|_/ / _ `/ __/  '_/ -_) __/
/_/  /_/\_,_/_/ /_/\_\\__/\__/
    "#
    );
}
