//! GiftGrid Core Library
//!
//! Domain/data layer of the GiftGrid corporate-rewards platform:
//! - Tenant directory (companies and stores)
//! - Catalog with per-tenant overrides and price tiers
//! - Append-only points wallet ledger
//! - Supplier synchronization engine and adapter capability
//! - Gift order scheduling
//! - Error types, configuration, and in-process boundary calls

pub mod api;
pub mod catalog;
pub mod config;
pub mod errors;
pub mod gifts;
pub mod models;
pub mod store;
pub mod suppliers;
pub mod telemetry;
pub mod tenants;
pub mod wallet;

// Re-export commonly used types
pub use catalog::CatalogStore;
pub use config::AppConfig;
pub use errors::{AppError, ErrorCode, Result};
pub use gifts::GiftOrderScheduler;
pub use store::AppStore;
pub use suppliers::SupplierSyncEngine;
pub use tenants::TenantDirectory;
pub use wallet::WalletLedger;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
