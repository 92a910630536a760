//! Tenant directory: companies and stores
//!
//! Owns the Company and Store collections and provides the tenant scoping
//! every other component relies on.

use crate::errors::{AppError, Result};
use crate::models::{Company, CompanyCreate, CompanyPatch, Store, StoreCreate};
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

#[derive(Default)]
struct DirectoryState {
    companies: HashMap<Uuid, Company>,
    stores: HashMap<Uuid, Store>,
}

/// Directory of tenants and their storefronts
#[derive(Default)]
pub struct TenantDirectory {
    state: RwLock<DirectoryState>,
}

impl TenantDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a company; settings fall back to defaults and are fixed from then on
    pub async fn create_company(&self, input: CompanyCreate) -> Result<Company> {
        if input.name.trim().is_empty() {
            return Err(AppError::MissingField {
                field: "name".into(),
            });
        }

        let now = Utc::now();
        let company = Company {
            id: Uuid::new_v4(),
            name: input.name,
            logo: input.logo,
            settings: input.settings.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        };

        let mut state = self.state.write().await;
        state.companies.insert(company.id, company.clone());

        info!(company_id = %company.id, name = %company.name, "Company created");
        Ok(company)
    }

    /// Shallow-merge a patch into an existing company; settings are untouched
    pub async fn update_company(&self, id: Uuid, patch: CompanyPatch) -> Result<Company> {
        let mut state = self.state.write().await;
        let company = state
            .companies
            .get_mut(&id)
            .ok_or_else(|| AppError::CompanyNotFound { id: id.to_string() })?;

        if let Some(name) = patch.name {
            if name.trim().is_empty() {
                return Err(AppError::MissingField {
                    field: "name".into(),
                });
            }
            company.name = name;
        }
        if let Some(logo) = patch.logo {
            company.logo = Some(logo);
        }
        company.updated_at = Utc::now();

        Ok(company.clone())
    }

    pub async fn get_company(&self, id: Uuid) -> Result<Company> {
        self.state
            .read()
            .await
            .companies
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::CompanyNotFound { id: id.to_string() })
    }

    pub async fn company_exists(&self, id: Uuid) -> bool {
        self.state.read().await.companies.contains_key(&id)
    }

    /// All companies, ordered by creation time
    pub async fn list_companies(&self) -> Vec<Company> {
        let state = self.state.read().await;
        let mut companies: Vec<_> = state.companies.values().cloned().collect();
        companies.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
        companies
    }

    /// Create a store; the owning company must exist
    pub async fn create_store(&self, input: StoreCreate) -> Result<Store> {
        if input.name.trim().is_empty() {
            return Err(AppError::MissingField {
                field: "name".into(),
            });
        }

        let mut state = self.state.write().await;
        if !state.companies.contains_key(&input.company_id) {
            return Err(AppError::Validation {
                message: format!("company {} does not exist", input.company_id),
                field: Some("company_id".into()),
            });
        }

        let store = Store {
            id: Uuid::new_v4(),
            company_id: input.company_id,
            name: input.name,
            created_at: Utc::now(),
        };
        state.stores.insert(store.id, store.clone());

        info!(store_id = %store.id, company_id = %store.company_id, "Store created");
        Ok(store)
    }

    pub async fn get_store(&self, id: Uuid) -> Result<Store> {
        self.state
            .read()
            .await
            .stores
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound {
                resource_type: "store".into(),
                id: id.to_string(),
            })
    }

    /// Stores scoped to one company; an unknown company yields an empty list
    pub async fn stores_by_company(&self, company_id: Uuid) -> Vec<Store> {
        let state = self.state.read().await;
        let mut stores: Vec<_> = state
            .stores
            .values()
            .filter(|s| s.company_id == company_id)
            .cloned()
            .collect();
        stores.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
        stores
    }
}
