//! Gift order scheduling
//!
//! Fans one sender request out into one order per recipient. Pricing and
//! stock come from the catalog's effective resolution; funds come from the
//! wallet ledger. The whole request is atomic: if any recipient's item set
//! cannot be funded or stocked, nothing is committed for anyone.

use crate::catalog::CatalogStore;
use crate::errors::{AppError, Result};
use crate::models::{GiftOrder, GiftOrderItem, GiftRequest};
use crate::wallet::WalletLedger;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, instrument};
use uuid::Uuid;

/// The gift scheduling component
pub struct GiftOrderScheduler {
    catalog: Arc<CatalogStore>,
    wallet: Arc<WalletLedger>,
    orders: RwLock<Vec<GiftOrder>>,
}

impl GiftOrderScheduler {
    pub fn new(catalog: Arc<CatalogStore>, wallet: Arc<WalletLedger>) -> Self {
        Self {
            catalog,
            wallet,
            orders: RwLock::new(Vec::new()),
        }
    }

    /// Schedule one gift order per recipient, debiting the sender once per
    /// recipient. Returns the created orders in recipient order.
    #[instrument(skip(self, request), fields(sender = %request.sender_email))]
    pub async fn schedule(&self, request: GiftRequest) -> Result<Vec<GiftOrder>> {
        if request.sender_email.trim().is_empty() {
            return Err(AppError::MissingField {
                field: "sender_email".into(),
            });
        }
        if request.recipients.is_empty() {
            return Err(AppError::Validation {
                message: "at least one recipient is required".into(),
                field: Some("recipients".into()),
            });
        }
        if request.items.is_empty() {
            return Err(AppError::Validation {
                message: "at least one item is required".into(),
                field: Some("items".into()),
            });
        }
        let scheduled_date = request.scheduled_date.ok_or_else(|| AppError::MissingField {
            field: "scheduled_date".into(),
        })?;

        // "today" is accepted; only strictly past dates are rejected
        let today = Utc::now().date_naive();
        if scheduled_date < today {
            return Err(AppError::Validation {
                message: format!("scheduled_date {scheduled_date} is in the past"),
                field: Some("scheduled_date".into()),
            });
        }

        for item in &request.items {
            if item.quantity < 1 {
                return Err(AppError::Validation {
                    message: "item quantity must be at least 1".into(),
                    field: Some("items".into()),
                });
            }
        }

        // Price one recipient's item set; every recipient receives the same
        // set, so the priced lines are shared.
        let mut lines = Vec::with_capacity(request.items.len());
        for item in &request.items {
            let effective = self
                .catalog
                .resolve_effective(request.company_id, item.product_id, item.quantity)
                .await?;

            // aggregate demand across the fan-out must fit the stock
            let demanded = item.quantity * request.recipients.len() as i64;
            if effective.stock < demanded {
                return Err(AppError::Validation {
                    message: format!(
                        "insufficient stock for {}: {} available, {} requested",
                        effective.name, effective.stock, demanded
                    ),
                    field: Some("items".into()),
                });
            }

            lines.push(GiftOrderItem {
                product_id: effective.id,
                name: effective.name,
                quantity: item.quantity,
                unit_price: effective.unit_price,
                line_total: effective.unit_price * item.quantity,
            });
        }
        let per_recipient_total: i64 = lines.iter().map(|l| l.line_total).sum();

        // One debit per recipient, committed all-or-nothing.
        let debits: Vec<(i64, String)> = request
            .recipients
            .iter()
            .map(|recipient| {
                (
                    per_recipient_total,
                    format!("Gift order for {recipient}"),
                )
            })
            .collect();
        self.wallet
            .debit_batch(&request.sender_email, &debits)
            .await?;

        let now = Utc::now();
        let orders: Vec<GiftOrder> = request
            .recipients
            .iter()
            .map(|recipient| GiftOrder {
                id: Uuid::new_v4(),
                company_id: request.company_id,
                sender_email: request.sender_email.clone(),
                recipient_email: recipient.clone(),
                items: lines.clone(),
                total: per_recipient_total,
                scheduled_date,
                message: request.message.clone(),
                created_at: now,
            })
            .collect();

        self.orders.write().await.extend(orders.iter().cloned());

        info!(
            recipients = orders.len(),
            total = per_recipient_total * orders.len() as i64,
            scheduled_date = %scheduled_date,
            "Gift orders scheduled"
        );
        Ok(orders)
    }

    /// Orders a sender has scheduled, in creation order
    pub async fn orders_for_sender(&self, sender_email: &str) -> Vec<GiftOrder> {
        self.orders
            .read()
            .await
            .iter()
            .filter(|o| o.sender_email == sender_email)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        BaseProductCreate, CompanyCreate, GiftItem, TransactionKind,
    };
    use crate::tenants::TenantDirectory;
    use chrono::Duration;

    struct Fixture {
        scheduler: GiftOrderScheduler,
        wallet: Arc<WalletLedger>,
        company_id: Uuid,
        product_id: Uuid,
    }

    async fn fixture(price: i64, stock: i64) -> Fixture {
        let tenants = Arc::new(TenantDirectory::new());
        let company = tenants
            .create_company(CompanyCreate {
                name: "Acme".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        let catalog = Arc::new(CatalogStore::new(tenants));
        let product = catalog
            .create_base_product(BaseProductCreate {
                name: "Mug".into(),
                category: "Drinkware".into(),
                price,
                stock,
                ..Default::default()
            })
            .await
            .unwrap();
        let wallet = Arc::new(WalletLedger::new());
        Fixture {
            scheduler: GiftOrderScheduler::new(catalog, wallet.clone()),
            wallet,
            company_id: company.id,
            product_id: product.id,
        }
    }

    fn request(f: &Fixture, recipients: &[&str], quantity: i64) -> GiftRequest {
        GiftRequest {
            company_id: f.company_id,
            sender_email: "ana@acme.com".into(),
            recipients: recipients.iter().map(|r| r.to_string()).collect(),
            items: vec![GiftItem {
                product_id: f.product_id,
                quantity,
            }],
            scheduled_date: Some(Utc::now().date_naive()),
            message: Some("Parabéns!".into()),
        }
    }

    #[tokio::test]
    async fn test_fan_out_one_order_and_debit_per_recipient() {
        let f = fixture(30, 100).await;
        f.wallet
            .append("ana@acme.com", TransactionKind::Credit, 100, "grant")
            .await
            .unwrap();

        let orders = f
            .scheduler
            .schedule(request(&f, &["bob@acme.com", "carol@acme.com"], 1))
            .await
            .unwrap();

        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].total, 30);
        assert_eq!(orders[1].recipient_email, "carol@acme.com");

        // ledger debited by exactly the sum of all recipients' totals
        assert_eq!(f.wallet.balance("ana@acme.com").await, 40);
        let history = f.wallet.history("ana@acme.com").await;
        assert_eq!(history.len(), 3); // 1 credit + 2 debits
    }

    #[tokio::test]
    async fn test_insufficient_funds_commits_nothing() {
        let f = fixture(60, 100).await;
        f.wallet
            .append("ana@acme.com", TransactionKind::Credit, 100, "grant")
            .await
            .unwrap();

        let orders = f
            .scheduler
            .schedule(request(&f, &["bob@acme.com"], 1))
            .await
            .unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(f.wallet.balance("ana@acme.com").await, 40);

        let err = f
            .scheduler
            .schedule(request(&f, &["carol@acme.com"], 1))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InsufficientFunds { .. }));

        assert_eq!(f.wallet.balance("ana@acme.com").await, 40);
        assert_eq!(f.scheduler.orders_for_sender("ana@acme.com").await.len(), 1);
    }

    #[tokio::test]
    async fn test_atomic_across_recipients() {
        let f = fixture(60, 100).await;
        f.wallet
            .append("ana@acme.com", TransactionKind::Credit, 100, "grant")
            .await
            .unwrap();

        // two recipients need 120; only 100 available, so nobody gets an order
        let err = f
            .scheduler
            .schedule(request(&f, &["bob@acme.com", "carol@acme.com"], 1))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InsufficientFunds { .. }));
        assert_eq!(f.wallet.balance("ana@acme.com").await, 100);
        assert!(f.scheduler.orders_for_sender("ana@acme.com").await.is_empty());
    }

    #[tokio::test]
    async fn test_stock_covers_the_whole_fan_out() {
        let f = fixture(10, 3).await;
        f.wallet
            .append("ana@acme.com", TransactionKind::Credit, 1000, "grant")
            .await
            .unwrap();

        let err = f
            .scheduler
            .schedule(request(&f, &["b@x.com", "c@x.com"], 2))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
        assert_eq!(f.wallet.balance("ana@acme.com").await, 1000);
    }

    #[tokio::test]
    async fn test_required_fields() {
        let f = fixture(10, 10).await;

        let mut r = request(&f, &[], 1);
        r.recipients = vec![];
        assert!(matches!(
            f.scheduler.schedule(r).await.unwrap_err(),
            AppError::Validation { .. }
        ));

        let mut r = request(&f, &["bob@acme.com"], 1);
        r.items = vec![];
        assert!(matches!(
            f.scheduler.schedule(r).await.unwrap_err(),
            AppError::Validation { .. }
        ));

        let mut r = request(&f, &["bob@acme.com"], 1);
        r.scheduled_date = None;
        assert!(matches!(
            f.scheduler.schedule(r).await.unwrap_err(),
            AppError::MissingField { .. }
        ));
    }

    #[tokio::test]
    async fn test_past_date_rejected_today_accepted() {
        let f = fixture(10, 10).await;
        f.wallet
            .append("ana@acme.com", TransactionKind::Credit, 100, "grant")
            .await
            .unwrap();

        let mut r = request(&f, &["bob@acme.com"], 1);
        r.scheduled_date = Some(Utc::now().date_naive() - Duration::days(1));
        assert!(matches!(
            f.scheduler.schedule(r).await.unwrap_err(),
            AppError::Validation { .. }
        ));

        // today is fine
        let r = request(&f, &["bob@acme.com"], 1);
        f.scheduler.schedule(r).await.unwrap();
    }
}
