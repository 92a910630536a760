//! Supplier synchronization engine
//!
//! Reconciles external supplier catalogs into the local one through the
//! adapter capability. Every started run writes exactly one immutable audit
//! log row; per-record failures are isolated and accumulated, never thrown.
//! At most one run may be in flight per supplier.

pub mod adapters;

use crate::catalog::CatalogStore;
use crate::config::SyncConfig;
use crate::errors::{AppError, Result};
use crate::models::{
    Supplier, SupplierApiType, SupplierCreate, SupplierStatus, SupplierSyncLog, SyncError,
    SyncRunResult, SyncType, UpsertOutcome,
};
use self::adapters::{spot_brindes_adapter, RecordFeed, SupplierAdapter};
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Rejection message for sync attempts against manual suppliers
pub const MANUAL_SYNC_UNSUPPORTED: &str =
    "Fornecedores manuais não suportam sincronização automática";

/// The sync engine component
pub struct SupplierSyncEngine {
    catalog: Arc<CatalogStore>,
    config: SyncConfig,
    suppliers: RwLock<HashMap<Uuid, Supplier>>,
    feeds: RwLock<HashMap<Uuid, Arc<dyn RecordFeed>>>,
    logs: RwLock<Vec<SupplierSyncLog>>,
    /// Suppliers with a run currently in flight
    in_flight: Mutex<HashSet<Uuid>>,
}

impl SupplierSyncEngine {
    pub fn new(catalog: Arc<CatalogStore>, config: SyncConfig) -> Self {
        Self {
            catalog,
            config,
            suppliers: RwLock::new(HashMap::new()),
            feeds: RwLock::new(HashMap::new()),
            logs: RwLock::new(Vec::new()),
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    // ========================================================================
    // Supplier records
    // ========================================================================

    pub async fn create_supplier(&self, input: SupplierCreate) -> Result<Supplier> {
        if input.name.trim().is_empty() {
            return Err(AppError::MissingField {
                field: "name".into(),
            });
        }

        let supplier = Supplier {
            id: Uuid::new_v4(),
            name: input.name,
            api_type: input.api_type,
            status: input.status,
            credentials: input.credentials,
            created_at: Utc::now(),
        };
        self.suppliers
            .write()
            .await
            .insert(supplier.id, supplier.clone());

        info!(supplier_id = %supplier.id, api_type = ?supplier.api_type, "Supplier created");
        Ok(supplier)
    }

    pub async fn get_supplier(&self, id: Uuid) -> Result<Supplier> {
        self.suppliers
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::SupplierNotFound { id: id.to_string() })
    }

    pub async fn list_suppliers(&self) -> Vec<Supplier> {
        let suppliers = self.suppliers.read().await;
        let mut all: Vec<_> = suppliers.values().cloned().collect();
        all.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
        all
    }

    /// Admin action: activate or deactivate a supplier
    pub async fn set_supplier_status(&self, id: Uuid, status: SupplierStatus) -> Result<Supplier> {
        let mut suppliers = self.suppliers.write().await;
        let supplier = suppliers
            .get_mut(&id)
            .ok_or_else(|| AppError::SupplierNotFound { id: id.to_string() })?;
        supplier.status = status;
        Ok(supplier.clone())
    }

    /// Plug the transport capability for one supplier
    pub async fn attach_feed(&self, supplier_id: Uuid, feed: Arc<dyn RecordFeed>) -> Result<()> {
        if !self.suppliers.read().await.contains_key(&supplier_id) {
            return Err(AppError::SupplierNotFound {
                id: supplier_id.to_string(),
            });
        }
        self.feeds.write().await.insert(supplier_id, feed);
        Ok(())
    }

    // ========================================================================
    // Sync runs
    // ========================================================================

    pub async fn sync_prices(
        &self,
        supplier_id: Uuid,
        skus: Option<Vec<String>>,
    ) -> Result<SyncRunResult> {
        self.sync(supplier_id, SyncType::Prices, skus).await
    }

    pub async fn sync_stock(
        &self,
        supplier_id: Uuid,
        skus: Option<Vec<String>>,
    ) -> Result<SyncRunResult> {
        self.sync(supplier_id, SyncType::Stock, skus).await
    }

    pub async fn sync_full(&self, supplier_id: Uuid) -> Result<SyncRunResult> {
        self.sync(supplier_id, SyncType::Full, None).await
    }

    /// Run one reconciliation against a supplier.
    ///
    /// Guard failures (unknown/inactive/manual/custom/unconfigured/busy)
    /// reject the call before a run starts and write no log. A started run
    /// always writes exactly one log row, even when the remote fetch fails
    /// outright or nothing changed.
    #[instrument(skip_all, fields(supplier_id = %supplier_id, sync_type = ?sync_type))]
    pub async fn sync(
        &self,
        supplier_id: Uuid,
        sync_type: SyncType,
        skus: Option<Vec<String>>,
    ) -> Result<SyncRunResult> {
        let supplier = self.get_supplier(supplier_id).await?;

        if supplier.status != SupplierStatus::Active {
            return Err(AppError::Validation {
                message: format!("supplier {} is inactive", supplier.id),
                field: Some("status".into()),
            });
        }

        // Adapter dispatch by api_type happens here, at the call boundary.
        let adapter: Arc<dyn SupplierAdapter> = match supplier.api_type {
            SupplierApiType::Manual => {
                return Err(AppError::UnsupportedOperation {
                    message: MANUAL_SYNC_UNSUPPORTED.to_string(),
                })
            }
            SupplierApiType::Custom => {
                return Err(AppError::NotImplemented {
                    message: "custom supplier APIs are not implemented in this version".into(),
                })
            }
            SupplierApiType::SpotBrindes => {
                let feed = self
                    .feeds
                    .read()
                    .await
                    .get(&supplier_id)
                    .cloned()
                    .ok_or_else(|| AppError::AdapterNotConfigured {
                        message: format!("no record feed attached for supplier {supplier_id}"),
                    })?;
                spot_brindes_adapter(&supplier, feed)
            }
        };

        if !adapter.is_configured() {
            return Err(AppError::AdapterNotConfigured {
                message: format!("supplier {} is missing API credentials", supplier.id),
            });
        }

        let _slot = self.acquire_slot(supplier_id)?;

        let started_at = Utc::now();
        let clock = Instant::now();

        let records = match adapter.fetch_records(skus.as_deref()).await {
            Ok(records) => records,
            Err(e) => {
                // The run started; it still gets its audit row.
                let message = e.to_string();
                self.write_log(SupplierSyncLog {
                    id: Uuid::new_v4(),
                    supplier_id,
                    sync_type,
                    started_at,
                    duration_ms: clock.elapsed().as_millis() as u64,
                    products_updated: 0,
                    products_created: 0,
                    products_failed: 0,
                    errors: vec![SyncError {
                        sku: None,
                        message: message.clone(),
                    }],
                })
                .await;
                warn!(error = %message, "Supplier fetch failed");
                return Err(AppError::Upstream { message });
            }
        };

        let mut created = 0u64;
        let mut updated = 0u64;
        let mut failed = 0u64;
        let mut errors: Vec<SyncError> = Vec::new();

        // Records are processed in the order the adapter returned them; one
        // bad record never aborts the run.
        for raw in &records {
            let sku = raw
                .get("codigo")
                .and_then(serde_json::Value::as_str)
                .map(str::to_string);

            let outcome = match adapter.parse_record(raw) {
                Ok(remote) => self.catalog.apply_remote(&remote, sync_type).await,
                Err(e) => Err(e),
            };

            match outcome {
                Ok(UpsertOutcome::Created) => created += 1,
                Ok(UpsertOutcome::Updated) => updated += 1,
                Ok(UpsertOutcome::Skipped) => {}
                Err(e) => {
                    failed += 1;
                    if errors.len() < self.config.max_recorded_errors {
                        errors.push(SyncError {
                            sku,
                            message: e.to_string(),
                        });
                    }
                }
            }
        }

        let result = SyncRunResult {
            success: failed == 0,
            sync_type,
            products_updated: updated,
            products_created: created,
            products_failed: failed,
            duration_ms: clock.elapsed().as_millis() as u64,
            errors,
        };

        self.write_log(SupplierSyncLog {
            id: Uuid::new_v4(),
            supplier_id,
            sync_type,
            started_at,
            duration_ms: result.duration_ms,
            products_updated: result.products_updated,
            products_created: result.products_created,
            products_failed: result.products_failed,
            errors: result.errors.clone(),
        })
        .await;

        info!(
            examined = records.len(),
            created = result.products_created,
            updated = result.products_updated,
            failed = result.products_failed,
            duration_ms = result.duration_ms,
            "Sync run finished"
        );
        Ok(result)
    }

    /// Audit rows for one supplier, oldest first
    pub async fn logs_for(&self, supplier_id: Uuid) -> Vec<SupplierSyncLog> {
        self.logs
            .read()
            .await
            .iter()
            .filter(|l| l.supplier_id == supplier_id)
            .cloned()
            .collect()
    }

    async fn write_log(&self, log: SupplierSyncLog) {
        self.logs.write().await.push(log);
    }

    fn acquire_slot(&self, supplier_id: Uuid) -> Result<SyncSlot<'_>> {
        let mut in_flight = self.in_flight.lock().expect("in-flight set poisoned");
        if !in_flight.insert(supplier_id) {
            return Err(AppError::SyncInProgress {
                supplier_id: supplier_id.to_string(),
            });
        }
        Ok(SyncSlot {
            engine: self,
            supplier_id,
        })
    }
}

/// Holds the per-supplier single-flight slot; released on drop in every path
struct SyncSlot<'a> {
    engine: &'a SupplierSyncEngine,
    supplier_id: Uuid,
}

impl Drop for SyncSlot<'_> {
    fn drop(&mut self) {
        if let Ok(mut in_flight) = self.engine.in_flight.lock() {
            in_flight.remove(&self.supplier_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::models::{CompanyCreate, SupplierCredentials};
    use crate::tenants::TenantDirectory;
    use super::adapters::StaticFeed;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::time::Duration;

    fn credentials() -> SupplierCredentials {
        SupplierCredentials {
            api_url: Some("https://api.spotbrindes.com.br/v1".into()),
            api_key: Some("token".into()),
        }
    }

    async fn engine() -> (Arc<CatalogStore>, SupplierSyncEngine) {
        let tenants = Arc::new(TenantDirectory::new());
        tenants
            .create_company(CompanyCreate {
                name: "Acme".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        let catalog = Arc::new(CatalogStore::new(tenants));
        let engine = SupplierSyncEngine::new(catalog.clone(), AppConfig::default().sync);
        (catalog, engine)
    }

    async fn active_supplier(
        engine: &SupplierSyncEngine,
        api_type: SupplierApiType,
    ) -> Supplier {
        engine
            .create_supplier(SupplierCreate {
                name: "Spot".into(),
                api_type,
                status: SupplierStatus::Active,
                credentials: credentials(),
            })
            .await
            .unwrap()
    }

    fn record(sku: &str, price: i64, stock: i64) -> Value {
        json!({
            "codigo": sku,
            "nome": format!("Produto {sku}"),
            "categoria": "Brindes",
            "preco": price,
            "estoque": stock,
        })
    }

    #[tokio::test]
    async fn test_full_sync_is_idempotent() {
        let (_, engine) = engine().await;
        let supplier = active_supplier(&engine, SupplierApiType::SpotBrindes).await;
        engine
            .attach_feed(
                supplier.id,
                Arc::new(StaticFeed::new(vec![record("A", 10, 5), record("B", 20, 3)])),
            )
            .await
            .unwrap();

        let first = engine.sync_full(supplier.id).await.unwrap();
        assert!(first.success);
        assert_eq!(first.products_created, 2);
        assert_eq!(first.products_updated, 0);

        let second = engine.sync_full(supplier.id).await.unwrap();
        assert!(second.success);
        assert_eq!(second.products_created, 0);
        assert_eq!(second.products_updated, 0);

        // one audit row per run
        assert_eq!(engine.logs_for(supplier.id).await.len(), 2);
    }

    #[tokio::test]
    async fn test_partial_failures_are_isolated() {
        let (_, engine) = engine().await;
        let supplier = active_supplier(&engine, SupplierApiType::SpotBrindes).await;

        let mut records: Vec<Value> = (0..8).map(|i| record(&format!("S{i}"), 10, 1)).collect();
        // two records that fail validation
        records.push(json!({"codigo": "BAD-1", "preco": "caro"}));
        records.push(json!({"nome": "sem codigo"}));
        engine
            .attach_feed(supplier.id, Arc::new(StaticFeed::new(records)))
            .await
            .unwrap();

        let result = engine.sync_full(supplier.id).await.unwrap();
        assert!(!result.success);
        assert_eq!(result.products_created, 8);
        assert_eq!(result.products_failed, 2);
        assert_eq!(result.errors.len(), 2);
        assert!(
            result.products_created + result.products_updated + result.products_failed <= 10
        );

        let logs = engine.logs_for(supplier.id).await;
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].errors.len(), 2);
        assert_eq!(logs[0].products_failed, 2);
    }

    #[tokio::test]
    async fn test_sku_subset_sync() {
        let (catalog, engine) = engine().await;
        let supplier = active_supplier(&engine, SupplierApiType::SpotBrindes).await;
        engine
            .attach_feed(
                supplier.id,
                Arc::new(StaticFeed::new(vec![record("A", 10, 5), record("B", 20, 3)])),
            )
            .await
            .unwrap();

        let result = engine
            .sync_prices(supplier.id, Some(vec!["A".to_string()]))
            .await
            .unwrap();
        assert_eq!(result.products_created, 1);

        let filter = crate::models::ProductFilter::default();
        assert_eq!(catalog.list_base_products(&filter).await.len(), 1);
    }

    #[tokio::test]
    async fn test_manual_supplier_rejected_with_localized_message() {
        let (_, engine) = engine().await;
        let supplier = active_supplier(&engine, SupplierApiType::Manual).await;

        let err = engine.sync_full(supplier.id).await.unwrap_err();
        match err {
            AppError::UnsupportedOperation { message } => {
                assert_eq!(message, MANUAL_SYNC_UNSUPPORTED)
            }
            other => panic!("unexpected error: {other:?}"),
        }
        // guard rejection writes no audit row
        assert!(engine.logs_for(supplier.id).await.is_empty());
    }

    #[tokio::test]
    async fn test_custom_supplier_not_implemented() {
        let (_, engine) = engine().await;
        let supplier = active_supplier(&engine, SupplierApiType::Custom).await;
        let err = engine.sync_full(supplier.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotImplemented { .. }));
    }

    #[tokio::test]
    async fn test_inactive_supplier_rejected() {
        let (_, engine) = engine().await;
        let supplier = engine
            .create_supplier(SupplierCreate {
                name: "Spot".into(),
                api_type: SupplierApiType::SpotBrindes,
                status: SupplierStatus::Inactive,
                credentials: credentials(),
            })
            .await
            .unwrap();
        let err = engine.sync_full(supplier.id).await.unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_missing_credentials_rejected() {
        let (_, engine) = engine().await;
        let supplier = engine
            .create_supplier(SupplierCreate {
                name: "Spot".into(),
                api_type: SupplierApiType::SpotBrindes,
                status: SupplierStatus::Active,
                credentials: SupplierCredentials::default(),
            })
            .await
            .unwrap();
        engine
            .attach_feed(supplier.id, Arc::new(StaticFeed::default()))
            .await
            .unwrap();

        let err = engine.sync_full(supplier.id).await.unwrap_err();
        assert!(matches!(err, AppError::AdapterNotConfigured { .. }));
    }

    #[tokio::test]
    async fn test_unknown_supplier_is_not_found() {
        let (_, engine) = engine().await;
        let err = engine.sync_full(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::SupplierNotFound { .. }));
    }

    /// Feed slow enough to hold a run in flight while a second one arrives
    struct SlowFeed;

    #[async_trait]
    impl RecordFeed for SlowFeed {
        async fn fetch(&self, _skus: Option<&[String]>) -> crate::errors::Result<Vec<Value>> {
            tokio::time::sleep(Duration::from_millis(500)).await;
            Ok(vec![])
        }
    }

    #[tokio::test]
    async fn test_concurrent_sync_for_same_supplier_rejected() {
        let (_, engine) = engine().await;
        let engine = Arc::new(engine);
        let supplier = active_supplier(&engine, SupplierApiType::SpotBrindes).await;
        engine
            .attach_feed(supplier.id, Arc::new(SlowFeed))
            .await
            .unwrap();

        let first = {
            let engine = engine.clone();
            let id = supplier.id;
            tokio::spawn(async move { engine.sync_full(id).await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;

        let err = engine.sync_full(supplier.id).await.unwrap_err();
        assert!(matches!(err, AppError::SyncInProgress { .. }));

        // the slot is released once the first run completes
        first.await.unwrap().unwrap();
        engine.sync_full(supplier.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_fetch_failure_still_writes_one_log_row() {
        struct FailingFeed;

        #[async_trait]
        impl RecordFeed for FailingFeed {
            async fn fetch(&self, _skus: Option<&[String]>) -> crate::errors::Result<Vec<Value>> {
                Err(AppError::Upstream {
                    message: "connection reset".into(),
                })
            }
        }

        let (_, engine) = engine().await;
        let supplier = active_supplier(&engine, SupplierApiType::SpotBrindes).await;
        engine
            .attach_feed(supplier.id, Arc::new(FailingFeed))
            .await
            .unwrap();

        let err = engine.sync_full(supplier.id).await.unwrap_err();
        assert!(matches!(err, AppError::Upstream { .. }));

        let logs = engine.logs_for(supplier.id).await;
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].errors.len(), 1);
    }
}
