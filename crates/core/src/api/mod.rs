//! In-process boundary calls
//!
//! The HTTP request-handling layer lives outside this crate; these calls
//! carry the same semantics it surfaces, including pagination envelopes,
//! localized field mapping, and the sync trigger contract.

use crate::errors::{AppError, Result};
use crate::models::{
    BaseProduct, BaseProductPatch, EffectiveProduct, GiftItem, GiftOrder, GiftRequest,
    ProductFilter, SyncRunResult, SyncType,
};
use crate::store::AppStore;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;
use validator::Validate;

/// Query for the paginated resolved catalog
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductQuery {
    pub page: Option<usize>,
    pub per_page: Option<usize>,
    pub search: Option<String>,
    pub category: Option<String>,
    /// Tenant scope; absent means the base catalog view
    pub company_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pagination {
    pub page: usize,
    pub per_page: usize,
    pub total: usize,
    pub total_pages: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageMeta {
    pub last_update: Option<DateTime<Utc>>,
}

/// One page of the resolved catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductPage {
    pub products: Vec<EffectiveProduct>,
    pub pagination: Pagination,
    pub meta: PageMeta,
}

/// List the resolved catalog with pagination
pub async fn list_products(store: &AppStore, query: ProductQuery) -> Result<ProductPage> {
    let filter = ProductFilter {
        category: query.category,
        search: query.search,
    };
    let listing = store.catalog.list_effective(query.company_id, &filter).await?;

    let per_page = store.config.clamp_page_size(query.per_page);
    let page = query.page.unwrap_or(1).max(1);
    let total = listing.len();
    let total_pages = total.div_ceil(per_page);

    let products = listing
        .into_iter()
        .skip((page - 1) * per_page)
        .take(per_page)
        .collect();

    Ok(ProductPage {
        products,
        pagination: Pagination {
            page,
            per_page,
            total,
            total_pages,
        },
        meta: PageMeta {
            last_update: store.catalog.last_update().await,
        },
    })
}

/// Response for a field-mapped product update
#[derive(Debug, Serialize)]
pub struct ProductUpdateResponse {
    pub success: bool,
    pub product: BaseProduct,
}

/// Update a product from localized field names.
///
/// Accepts the pt-BR names the storefront sends (`nome`, `descricao`,
/// `preco`, `estoque`, `categoria`) as well as the canonical ones; unknown
/// fields are ignored, ill-typed values rejected.
pub async fn update_product_localized(
    store: &AppStore,
    id: Uuid,
    fields: &serde_json::Map<String, Value>,
) -> Result<ProductUpdateResponse> {
    let mut patch = BaseProductPatch::default();

    for (key, value) in fields {
        match key.as_str() {
            "nome" | "name" => patch.name = Some(expect_string(key, value)?),
            "descricao" | "description" => patch.description = Some(expect_string(key, value)?),
            "categoria" | "category" => patch.category = Some(expect_string(key, value)?),
            "preco" | "price" => patch.price = Some(expect_integer(key, value)?),
            "estoque" | "stock" => patch.stock = Some(expect_integer(key, value)?),
            "sku" => patch.sku = Some(expect_string(key, value)?),
            "ncm" => patch.ncm = Some(expect_string(key, value)?),
            _ => {}
        }
    }

    let product = store.catalog.update_base_product(id, patch).await?;
    Ok(ProductUpdateResponse {
        success: true,
        product,
    })
}

fn expect_string(key: &str, value: &Value) -> Result<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| AppError::InvalidFormat {
            message: format!("field {key} must be a string"),
        })
}

fn expect_integer(key: &str, value: &Value) -> Result<i64> {
    value.as_i64().ok_or_else(|| AppError::InvalidFormat {
        message: format!("field {key} must be an integer"),
    })
}

/// Request to schedule gift orders
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GiftScheduleRequest {
    pub company_id: Uuid,

    #[validate(email)]
    pub sender_email: String,

    #[validate(length(min = 1, message = "at least one recipient is required"))]
    pub recipients: Vec<String>,

    #[validate(length(min = 1, message = "at least one item is required"))]
    pub items: Vec<GiftItem>,

    pub scheduled_date: Option<NaiveDate>,

    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GiftScheduleResponse {
    pub success: bool,
    pub orders: Vec<GiftOrder>,
}

/// Schedule one gift order per recipient
pub async fn schedule_gifts(
    store: &AppStore,
    request: GiftScheduleRequest,
) -> Result<GiftScheduleResponse> {
    request.validate()?;

    let orders = store
        .gifts
        .schedule(GiftRequest {
            company_id: request.company_id,
            sender_email: request.sender_email,
            recipients: request.recipients,
            items: request.items,
            scheduled_date: request.scheduled_date,
            message: request.message,
        })
        .await?;

    Ok(GiftScheduleResponse {
        success: true,
        orders,
    })
}

/// Body of a sync trigger
#[derive(Debug, Clone, Deserialize)]
pub struct SyncRequest {
    #[serde(rename = "type")]
    pub sync_type: SyncType,
    pub product_ids: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct SyncResponse {
    pub success: bool,
    pub data: SyncRunResult,
}

/// Trigger a sync run against a supplier
pub async fn trigger_sync(
    store: &AppStore,
    supplier_id: Uuid,
    request: SyncRequest,
) -> Result<SyncResponse> {
    let data = store
        .suppliers
        .sync(supplier_id, request.sync_type, request.product_ids)
        .await?;

    Ok(SyncResponse {
        success: data.success,
        data,
    })
}
