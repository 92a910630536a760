//! Points ledger entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Sign of a ledger entry; amounts themselves are always positive
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Credit,
    Debit,
}

/// One immutable ledger entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PointsTransaction {
    pub id: Uuid,
    pub user_id: String,
    pub kind: TransactionKind,
    /// Strictly positive; the sign is carried by `kind`
    pub amount: i64,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl PointsTransaction {
    /// Signed contribution of this entry to the balance
    pub fn signed_amount(&self) -> i64 {
        match self.kind {
            TransactionKind::Credit => self.amount,
            TransactionKind::Debit => -self.amount,
        }
    }
}
