//! Catalog entities: base products, per-tenant overrides, price tiers
//!
//! All monetary amounts are integer points.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Global catalog source of truth
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BaseProduct {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    /// Unit price in points
    pub price: i64,
    pub stock: i64,
    /// External SKU used to match supplier records
    pub sku: Option<String>,
    /// Mercosur tax classification code carried from supplier feeds
    pub ncm: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create base product payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BaseProductCreate {
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    #[serde(default)]
    pub price: i64,
    #[serde(default)]
    pub stock: i64,
    pub sku: Option<String>,
    pub ncm: Option<String>,
}

/// Partial update payload; `id` is never patchable
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BaseProductPatch {
    pub name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub stock: Option<i64>,
    pub sku: Option<String>,
    pub ncm: Option<String>,
}

impl BaseProductPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.category.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.stock.is_none()
            && self.sku.is_none()
            && self.ncm.is_none()
    }
}

/// Per-tenant override of a base product.
///
/// Only the fields a tenant actually overrides are set; resolution applies
/// them field-by-field on top of the base record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompanyProduct {
    pub id: Uuid,
    pub company_id: Uuid,
    pub base_product_id: Uuid,
    pub visible: bool,
    pub price: Option<i64>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Upsert payload for a company override
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyProductInput {
    pub company_id: Uuid,
    pub base_product_id: Uuid,
    #[serde(default = "default_visible")]
    pub visible: bool,
    pub price: Option<i64>,
    pub name: Option<String>,
    pub description: Option<String>,
}

fn default_visible() -> bool {
    true
}

/// Quantity-bracketed unit price.
///
/// A bracket covers [min_qty, next bracket's min_qty) within its scope;
/// `company_tier_id = None` is the global scope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceTier {
    pub id: Uuid,
    pub company_tier_id: Option<Uuid>,
    pub min_qty: i64,
    pub unit_price: i64,
}

/// The resolved tenant view of one product at one quantity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EffectiveProduct {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    /// Unit price after override and tier resolution
    pub unit_price: i64,
    pub stock: i64,
    pub sku: Option<String>,
    pub ncm: Option<String>,
}

/// Catalog listing filter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductFilter {
    /// Exact category match
    pub category: Option<String>,
    /// Case-insensitive substring search over name + description
    pub search: Option<String>,
}
