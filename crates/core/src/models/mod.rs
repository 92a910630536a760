//! Domain entities and payload types

pub mod company;
pub mod gift;
pub mod product;
pub mod supplier;
pub mod wallet;

pub use company::{Company, CompanyCreate, CompanyPatch, CompanySettings, Store, StoreCreate};
pub use gift::{GiftItem, GiftOrder, GiftOrderItem, GiftRequest};
pub use product::{
    BaseProduct, BaseProductCreate, BaseProductPatch, CompanyProduct, CompanyProductInput,
    EffectiveProduct, PriceTier, ProductFilter,
};
pub use supplier::{
    RemoteProduct, Supplier, SupplierApiType, SupplierCreate, SupplierCredentials, SupplierStatus,
    SupplierSyncLog, SyncError, SyncRunResult, SyncType, UpsertOutcome,
};
pub use wallet::{PointsTransaction, TransactionKind};
