//! Supplier entities and sync run records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// External catalog source
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Supplier {
    pub id: Uuid,
    pub name: String,
    pub api_type: SupplierApiType,
    pub status: SupplierStatus,
    pub credentials: SupplierCredentials,
    pub created_at: DateTime<Utc>,
}

/// Which integration a supplier speaks
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SupplierApiType {
    SpotBrindes,
    Custom,
    Manual,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SupplierStatus {
    Active,
    Inactive,
}

/// Supplier API credentials
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SupplierCredentials {
    pub api_url: Option<String>,
    pub api_key: Option<String>,
}

/// Create supplier payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplierCreate {
    pub name: String,
    pub api_type: SupplierApiType,
    #[serde(default = "default_status")]
    pub status: SupplierStatus,
    #[serde(default)]
    pub credentials: SupplierCredentials,
}

fn default_status() -> SupplierStatus {
    SupplierStatus::Inactive
}

/// Which fields a sync run reconciles
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SyncType {
    Prices,
    Stock,
    Full,
}

/// A supplier record normalized into catalog terms
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RemoteProduct {
    pub sku: String,
    pub name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    /// Unit price in points
    pub price: Option<i64>,
    pub stock: Option<i64>,
    pub ncm: Option<String>,
}

/// What one upsert against the catalog did
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UpsertOutcome {
    Created,
    Updated,
    Skipped,
}

/// One isolated per-record failure inside a sync run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyncError {
    pub sku: Option<String>,
    pub message: String,
}

/// Result of one sync run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyncRunResult {
    /// True iff no record failed
    pub success: bool,
    pub sync_type: SyncType,
    pub products_updated: u64,
    pub products_created: u64,
    pub products_failed: u64,
    /// Wall-clock time of the whole run
    pub duration_ms: u64,
    pub errors: Vec<SyncError>,
}

/// Immutable audit record of one sync run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SupplierSyncLog {
    pub id: Uuid,
    pub supplier_id: Uuid,
    pub sync_type: SyncType,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub products_updated: u64,
    pub products_created: u64,
    pub products_failed: u64,
    pub errors: Vec<SyncError>,
}
