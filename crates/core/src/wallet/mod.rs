//! Points wallet ledger
//!
//! Append-only transaction log per member. Balances are derived from the
//! ledger; a running balance is cached per user and must always equal the
//! signed ledger sum. The overdraft check and the append happen inside one
//! critical section, so concurrent debits can never both pass against a
//! stale balance.

use crate::errors::{AppError, Result};
use crate::models::{PointsTransaction, TransactionKind};
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

#[derive(Default)]
struct LedgerState {
    entries: Vec<PointsTransaction>,
    balances: HashMap<String, i64>,
}

impl LedgerState {
    fn balance_of(&self, user_id: &str) -> i64 {
        self.balances.get(user_id).copied().unwrap_or(0)
    }

    fn commit(&mut self, row: PointsTransaction) -> PointsTransaction {
        *self.balances.entry(row.user_id.clone()).or_insert(0) += row.signed_amount();
        self.entries.push(row.clone());
        row
    }
}

/// The ledger component
#[derive(Default)]
pub struct WalletLedger {
    state: Mutex<LedgerState>,
}

impl WalletLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one entry. Amount must be strictly positive; a debit that
    /// would take the balance below zero fails with no ledger change.
    pub async fn append(
        &self,
        user_id: &str,
        kind: TransactionKind,
        amount: i64,
        description: &str,
    ) -> Result<PointsTransaction> {
        let mut state = self.state.lock().await;
        let row = Self::build_row(&state, user_id, kind, amount, description)?;
        let row = state.commit(row);

        info!(
            user_id = %row.user_id,
            kind = ?row.kind,
            amount = row.amount,
            "Ledger entry appended"
        );
        Ok(row)
    }

    /// Append several debits for one user, all-or-nothing.
    ///
    /// The combined overdraft check runs against the pre-read balance inside
    /// the same critical section as the appends; if any debit would overdraw,
    /// none is committed.
    pub async fn debit_batch(
        &self,
        user_id: &str,
        debits: &[(i64, String)],
    ) -> Result<Vec<PointsTransaction>> {
        let mut state = self.state.lock().await;

        let mut projected = state.balance_of(user_id);
        let mut rows = Vec::with_capacity(debits.len());
        for (amount, description) in debits {
            let row = Self::build_row(
                &state,
                user_id,
                TransactionKind::Debit,
                *amount,
                description,
            )?;
            projected -= *amount;
            if projected < 0 {
                return Err(AppError::InsufficientFunds {
                    balance: state.balance_of(user_id),
                    attempted: debits.iter().map(|(a, _)| *a).sum(),
                });
            }
            rows.push(row);
        }

        Ok(rows.into_iter().map(|r| state.commit(r)).collect())
    }

    /// Current balance; zero for users with no history
    pub async fn balance(&self, user_id: &str) -> i64 {
        self.state.lock().await.balance_of(user_id)
    }

    /// A user's entries in append order
    pub async fn history(&self, user_id: &str) -> Vec<PointsTransaction> {
        self.state
            .lock()
            .await
            .entries
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect()
    }

    fn build_row(
        state: &LedgerState,
        user_id: &str,
        kind: TransactionKind,
        amount: i64,
        description: &str,
    ) -> Result<PointsTransaction> {
        if amount <= 0 {
            return Err(AppError::Validation {
                message: "transaction amount must be strictly positive".into(),
                field: Some("amount".into()),
            });
        }
        if kind == TransactionKind::Debit && state.balance_of(user_id) < amount {
            return Err(AppError::InsufficientFunds {
                balance: state.balance_of(user_id),
                attempted: amount,
            });
        }

        Ok(PointsTransaction {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            kind,
            amount,
            description: description.to_string(),
            created_at: Utc::now(),
        })
    }
}
