//! The process-wide store object
//!
//! One [`AppStore`] is constructed at process start and passed by reference
//! to every caller; there are no module-level singletons. It wires the
//! domain components together in dependency order.

use crate::catalog::CatalogStore;
use crate::config::AppConfig;
use crate::gifts::GiftOrderScheduler;
use crate::suppliers::SupplierSyncEngine;
use crate::tenants::TenantDirectory;
use crate::wallet::WalletLedger;
use std::sync::Arc;
use tracing::info;

/// Shared handle over every domain component
#[derive(Clone)]
pub struct AppStore {
    pub config: Arc<AppConfig>,
    pub tenants: Arc<TenantDirectory>,
    pub catalog: Arc<CatalogStore>,
    pub wallet: Arc<WalletLedger>,
    pub suppliers: Arc<SupplierSyncEngine>,
    pub gifts: Arc<GiftOrderScheduler>,
}

impl AppStore {
    /// Build the store and wire components in dependency order
    pub fn new(config: AppConfig) -> Self {
        let config = Arc::new(config);
        let tenants = Arc::new(TenantDirectory::new());
        let catalog = Arc::new(CatalogStore::new(tenants.clone()));
        let wallet = Arc::new(WalletLedger::new());
        let suppliers = Arc::new(SupplierSyncEngine::new(
            catalog.clone(),
            config.sync.clone(),
        ));
        let gifts = Arc::new(GiftOrderScheduler::new(catalog.clone(), wallet.clone()));

        info!("Application store initialized");
        Self {
            config,
            tenants,
            catalog,
            wallet,
            suppliers,
            gifts,
        }
    }
}

impl Default for AppStore {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BaseProductCreate, CompanyCreate};

    #[tokio::test]
    async fn test_components_share_state() {
        let store = AppStore::default();

        let company = store
            .tenants
            .create_company(CompanyCreate {
                name: "Acme".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        let product = store
            .catalog
            .create_base_product(BaseProductCreate {
                name: "Mug".into(),
                category: "Drinkware".into(),
                price: 10,
                stock: 5,
                ..Default::default()
            })
            .await
            .unwrap();

        // the catalog sees the directory created through the same store
        let effective = store
            .catalog
            .resolve_effective(company.id, product.id, 1)
            .await
            .unwrap();
        assert_eq!(effective.unit_price, 10);
    }
}
