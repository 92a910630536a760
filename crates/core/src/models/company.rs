//! Tenant entities: companies and their stores

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A tenant of the platform
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Company {
    pub id: Uuid,
    pub name: String,
    pub logo: Option<String>,
    /// Fixed at creation; never patched afterwards
    pub settings: CompanySettings,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Per-tenant settings, applied as defaults when the company is created
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompanySettings {
    /// Price-tier group this company belongs to, if any
    pub price_tier_id: Option<Uuid>,

    /// Display label for the points currency
    pub points_label: String,

    /// Whether members of this company may schedule gift orders
    pub gifting_enabled: bool,
}

impl Default for CompanySettings {
    fn default() -> Self {
        Self {
            price_tier_id: None,
            points_label: "pontos".to_string(),
            gifting_enabled: true,
        }
    }
}

/// Create company payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompanyCreate {
    pub name: String,
    pub logo: Option<String>,
    /// Optional settings; defaults are applied when absent
    pub settings: Option<CompanySettings>,
}

/// Update company payload (settings are immutable and intentionally absent)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompanyPatch {
    pub name: Option<String>,
    pub logo: Option<String>,
}

/// A storefront owned by a company
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Store {
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Create store payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreCreate {
    pub company_id: Uuid,
    pub name: String,
}
