//! Catalog store
//!
//! Owns the global product catalog, per-tenant overrides, and price tiers,
//! and resolves the effective product view for a tenant/quantity. The
//! supplier sync engine mutates the catalog exclusively through
//! [`CatalogStore::apply_remote`].

use crate::errors::{AppError, Result};
use crate::models::{
    BaseProduct, BaseProductCreate, BaseProductPatch, CompanyProduct, CompanyProductInput,
    EffectiveProduct, PriceTier, ProductFilter, RemoteProduct, SyncType, UpsertOutcome,
};
use crate::tenants::TenantDirectory;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Default)]
struct CatalogState {
    products: HashMap<Uuid, BaseProduct>,
    /// At most one override per (company_id, base_product_id)
    overrides: HashMap<(Uuid, Uuid), CompanyProduct>,
    tiers: Vec<PriceTier>,
    last_update: Option<DateTime<Utc>>,
}

impl CatalogState {
    fn touch(&mut self, at: DateTime<Utc>) {
        self.last_update = Some(at);
    }

    fn find_by_sku(&self, sku: &str) -> Option<Uuid> {
        self.products
            .values()
            .find(|p| p.sku.as_deref() == Some(sku))
            .map(|p| p.id)
    }
}

/// The catalog component
pub struct CatalogStore {
    tenants: Arc<TenantDirectory>,
    state: RwLock<CatalogState>,
}

impl CatalogStore {
    pub fn new(tenants: Arc<TenantDirectory>) -> Self {
        Self {
            tenants,
            state: RwLock::new(CatalogState::default()),
        }
    }

    // ========================================================================
    // Base products
    // ========================================================================

    /// Create a base product; name and category are required
    pub async fn create_base_product(&self, input: BaseProductCreate) -> Result<BaseProduct> {
        if input.name.trim().is_empty() {
            return Err(AppError::MissingField {
                field: "name".into(),
            });
        }
        if input.category.trim().is_empty() {
            return Err(AppError::MissingField {
                field: "category".into(),
            });
        }

        let now = Utc::now();
        let product = BaseProduct {
            id: Uuid::new_v4(),
            name: input.name,
            category: input.category,
            description: input.description,
            price: input.price,
            stock: input.stock,
            sku: input.sku,
            ncm: input.ncm,
            created_at: now,
            updated_at: now,
        };

        let mut state = self.state.write().await;
        state.products.insert(product.id, product.clone());
        state.touch(now);

        info!(product_id = %product.id, name = %product.name, "Base product created");
        Ok(product)
    }

    pub async fn get_base_product(&self, id: Uuid) -> Result<BaseProduct> {
        self.state
            .read()
            .await
            .products
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::ProductNotFound { id: id.to_string() })
    }

    /// List products matching the filter, ordered by creation time
    pub async fn list_base_products(&self, filter: &ProductFilter) -> Vec<BaseProduct> {
        let state = self.state.read().await;
        let needle = filter.search.as_ref().map(|s| s.to_lowercase());

        let mut products: Vec<_> = state
            .products
            .values()
            .filter(|p| {
                filter
                    .category
                    .as_ref()
                    .map(|c| &p.category == c)
                    .unwrap_or(true)
            })
            .filter(|p| match &needle {
                Some(needle) => {
                    p.name.to_lowercase().contains(needle)
                        || p.description
                            .as_ref()
                            .map(|d| d.to_lowercase().contains(needle))
                            .unwrap_or(false)
                }
                None => true,
            })
            .cloned()
            .collect();

        products.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
        products
    }

    /// Shallow-merge a patch; the id is never changed
    pub async fn update_base_product(
        &self,
        id: Uuid,
        patch: BaseProductPatch,
    ) -> Result<BaseProduct> {
        let mut state = self.state.write().await;
        let now = Utc::now();

        let product = state
            .products
            .get_mut(&id)
            .ok_or_else(|| AppError::ProductNotFound { id: id.to_string() })?;

        if let Some(name) = patch.name {
            product.name = name;
        }
        if let Some(category) = patch.category {
            product.category = category;
        }
        if let Some(description) = patch.description {
            product.description = Some(description);
        }
        if let Some(price) = patch.price {
            product.price = price;
        }
        if let Some(stock) = patch.stock {
            product.stock = stock;
        }
        if let Some(sku) = patch.sku {
            product.sku = Some(sku);
        }
        if let Some(ncm) = patch.ncm {
            product.ncm = Some(ncm);
        }
        product.updated_at = now;

        let updated = product.clone();
        state.touch(now);
        Ok(updated)
    }

    /// Delete a base product.
    ///
    /// Company overrides referencing it are retained: they become inert until
    /// the base id is recreated or the override is removed explicitly, so a
    /// dangling reference can never crash a read.
    pub async fn delete_base_product(&self, id: Uuid) -> Result<()> {
        let mut state = self.state.write().await;
        if state.products.remove(&id).is_none() {
            return Err(AppError::ProductNotFound { id: id.to_string() });
        }
        state.touch(Utc::now());

        info!(product_id = %id, "Base product deleted; overrides left inert");
        Ok(())
    }

    // ========================================================================
    // Company overrides
    // ========================================================================

    /// Create or replace the override for (company, base product)
    pub async fn upsert_override(&self, input: CompanyProductInput) -> Result<CompanyProduct> {
        let mut state = self.state.write().await;
        if !state.products.contains_key(&input.base_product_id) {
            return Err(AppError::ProductNotFound {
                id: input.base_product_id.to_string(),
            });
        }

        let now = Utc::now();
        let key = (input.company_id, input.base_product_id);
        let id = state.overrides.get(&key).map(|o| o.id).unwrap_or_else(Uuid::new_v4);

        let override_row = CompanyProduct {
            id,
            company_id: input.company_id,
            base_product_id: input.base_product_id,
            visible: input.visible,
            price: input.price,
            name: input.name,
            description: input.description,
            updated_at: now,
        };
        state.overrides.insert(key, override_row.clone());
        state.touch(now);

        debug!(
            company_id = %input.company_id,
            base_product_id = %input.base_product_id,
            "Company override upserted"
        );
        Ok(override_row)
    }

    pub async fn remove_override(&self, company_id: Uuid, base_product_id: Uuid) -> Result<()> {
        let mut state = self.state.write().await;
        state
            .overrides
            .remove(&(company_id, base_product_id))
            .ok_or_else(|| AppError::NotFound {
                resource_type: "company_product".into(),
                id: base_product_id.to_string(),
            })?;
        state.touch(Utc::now());
        Ok(())
    }

    pub async fn get_override(
        &self,
        company_id: Uuid,
        base_product_id: Uuid,
    ) -> Option<CompanyProduct> {
        self.state
            .read()
            .await
            .overrides
            .get(&(company_id, base_product_id))
            .cloned()
    }

    // ========================================================================
    // Price tiers
    // ========================================================================

    /// Add a quantity bracket; min_qty must be unique within its scope
    pub async fn add_price_tier(
        &self,
        company_tier_id: Option<Uuid>,
        min_qty: i64,
        unit_price: i64,
    ) -> Result<PriceTier> {
        if min_qty < 1 {
            return Err(AppError::Validation {
                message: "min_qty must be at least 1".into(),
                field: Some("min_qty".into()),
            });
        }

        let mut state = self.state.write().await;
        if state
            .tiers
            .iter()
            .any(|t| t.company_tier_id == company_tier_id && t.min_qty == min_qty)
        {
            return Err(AppError::Validation {
                message: format!("a price bracket at min_qty {min_qty} already exists for this scope"),
                field: Some("min_qty".into()),
            });
        }

        let tier = PriceTier {
            id: Uuid::new_v4(),
            company_tier_id,
            min_qty,
            unit_price,
        };
        state.tiers.push(tier.clone());
        Ok(tier)
    }

    // ========================================================================
    // Effective resolution
    // ========================================================================

    /// Resolve the effective product for a tenant at a quantity.
    ///
    /// Base fields, then override fields where the override defines them,
    /// then the price bracket containing `quantity` for the company's tier.
    /// Same inputs against the same catalog state always produce the same
    /// view. An override with `visible == false` makes the product
    /// unresolvable for that tenant.
    pub async fn resolve_effective(
        &self,
        company_id: Uuid,
        base_product_id: Uuid,
        quantity: i64,
    ) -> Result<EffectiveProduct> {
        let company = self.tenants.get_company(company_id).await?;

        let state = self.state.read().await;
        let base = state
            .products
            .get(&base_product_id)
            .ok_or_else(|| AppError::ProductNotFound {
                id: base_product_id.to_string(),
            })?;
        let override_row = state.overrides.get(&(company_id, base_product_id));

        if let Some(o) = override_row {
            if !o.visible {
                return Err(AppError::ProductNotFound {
                    id: base_product_id.to_string(),
                });
            }
        }

        let mut effective = apply_override(base, override_row);

        if let Some(tier_price) =
            bracket_price(&state.tiers, company.settings.price_tier_id, quantity)
        {
            effective.unit_price = tier_price;
        }

        Ok(effective)
    }

    /// Resolved listing view of the catalog.
    ///
    /// Without a company this is the base catalog; with one, overrides are
    /// applied, invisible products dropped, and single-unit tier pricing
    /// used. Ordering matches [`CatalogStore::list_base_products`].
    pub async fn list_effective(
        &self,
        company_id: Option<Uuid>,
        filter: &ProductFilter,
    ) -> Result<Vec<EffectiveProduct>> {
        let company = match company_id {
            Some(id) => Some(self.tenants.get_company(id).await?),
            None => None,
        };
        let bases = self.list_base_products(filter).await;

        let state = self.state.read().await;
        let mut listing = Vec::with_capacity(bases.len());
        for base in &bases {
            let override_row = company
                .as_ref()
                .and_then(|c| state.overrides.get(&(c.id, base.id)));
            if let Some(o) = override_row {
                if !o.visible {
                    continue;
                }
            }

            let mut effective = apply_override(base, override_row);
            if let Some(company) = &company {
                if let Some(price) =
                    bracket_price(&state.tiers, company.settings.price_tier_id, 1)
                {
                    effective.unit_price = price;
                }
            }
            listing.push(effective);
        }
        Ok(listing)
    }

    /// Timestamp of the most recent catalog mutation
    pub async fn last_update(&self) -> Option<DateTime<Utc>> {
        self.state.read().await.last_update
    }

    // ========================================================================
    // Supplier upsert contract
    // ========================================================================

    /// Apply one normalized supplier record.
    ///
    /// Matches by SKU: unseen SKUs are created (name and category required),
    /// known SKUs are updated within the sync scope, and a no-op reports
    /// `Skipped`. This is the only mutation path the sync engine may use.
    pub async fn apply_remote(
        &self,
        remote: &RemoteProduct,
        scope: SyncType,
    ) -> Result<UpsertOutcome> {
        let mut state = self.state.write().await;
        let now = Utc::now();

        let Some(existing_id) = state.find_by_sku(&remote.sku) else {
            let name = remote
                .name
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .ok_or_else(|| AppError::Validation {
                    message: format!("remote record {} has no name", remote.sku),
                    field: Some("name".into()),
                })?;
            let category = remote
                .category
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .ok_or_else(|| AppError::Validation {
                    message: format!("remote record {} has no category", remote.sku),
                    field: Some("category".into()),
                })?;

            let product = BaseProduct {
                id: Uuid::new_v4(),
                name: name.to_string(),
                category: category.to_string(),
                description: remote.description.clone(),
                price: remote.price.unwrap_or(0),
                stock: remote.stock.unwrap_or(0),
                sku: Some(remote.sku.clone()),
                ncm: remote.ncm.clone(),
                created_at: now,
                updated_at: now,
            };
            state.products.insert(product.id, product);
            state.touch(now);
            return Ok(UpsertOutcome::Created);
        };

        let product = state
            .products
            .get_mut(&existing_id)
            .expect("sku index resolved to a live product");

        let mut changed = false;
        let sync_prices = matches!(scope, SyncType::Prices | SyncType::Full);
        let sync_stock = matches!(scope, SyncType::Stock | SyncType::Full);

        if sync_prices {
            if let Some(price) = remote.price {
                if product.price != price {
                    product.price = price;
                    changed = true;
                }
            }
        }
        if sync_stock {
            if let Some(stock) = remote.stock {
                if product.stock != stock {
                    product.stock = stock;
                    changed = true;
                }
            }
        }
        if scope == SyncType::Full {
            if let Some(name) = remote.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
                if product.name != name {
                    product.name = name.to_string();
                    changed = true;
                }
            }
            if let Some(category) = remote
                .category
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
            {
                if product.category != category {
                    product.category = category.to_string();
                    changed = true;
                }
            }
            if let Some(description) = &remote.description {
                if product.description.as_deref() != Some(description) {
                    product.description = Some(description.clone());
                    changed = true;
                }
            }
            if let Some(ncm) = &remote.ncm {
                if product.ncm.as_deref() != Some(ncm) {
                    product.ncm = Some(ncm.clone());
                    changed = true;
                }
            }
        }

        if changed {
            product.updated_at = now;
            state.touch(now);
            Ok(UpsertOutcome::Updated)
        } else {
            Ok(UpsertOutcome::Skipped)
        }
    }
}

/// Base fields with override fields applied where present
fn apply_override(base: &BaseProduct, override_row: Option<&CompanyProduct>) -> EffectiveProduct {
    let mut effective = EffectiveProduct {
        id: base.id,
        name: base.name.clone(),
        category: base.category.clone(),
        description: base.description.clone(),
        unit_price: base.price,
        stock: base.stock,
        sku: base.sku.clone(),
        ncm: base.ncm.clone(),
    };

    if let Some(o) = override_row {
        if let Some(price) = o.price {
            effective.unit_price = price;
        }
        if let Some(name) = &o.name {
            effective.name = name.clone();
        }
        if let Some(description) = &o.description {
            effective.description = Some(description.clone());
        }
    }

    effective
}

/// Unit price from the bracket containing `quantity`, if any.
///
/// Brackets scoped to the company's tier shadow global brackets; within a
/// scope the bracket with the largest min_qty not exceeding the quantity wins.
fn bracket_price(tiers: &[PriceTier], company_tier_id: Option<Uuid>, quantity: i64) -> Option<i64> {
    let pick = |scope: Option<Uuid>| {
        tiers
            .iter()
            .filter(|t| t.company_tier_id == scope && t.min_qty <= quantity)
            .max_by_key(|t| t.min_qty)
            .map(|t| t.unit_price)
    };

    company_tier_id.and_then(|tier| pick(Some(tier))).or_else(|| pick(None))
}
