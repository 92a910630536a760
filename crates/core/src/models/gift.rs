//! Gift order entities and scheduling payloads

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One item in a gift request, priced at scheduling time
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GiftItem {
    pub product_id: Uuid,
    pub quantity: i64,
}

/// One sender request fanning out to many recipients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GiftRequest {
    pub company_id: Uuid,
    pub sender_email: String,
    pub recipients: Vec<String>,
    pub items: Vec<GiftItem>,
    pub scheduled_date: Option<NaiveDate>,
    pub message: Option<String>,
}

/// A priced line inside a committed gift order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GiftOrderItem {
    pub product_id: Uuid,
    pub name: String,
    pub quantity: i64,
    /// Effective unit price at scheduling time, in points
    pub unit_price: i64,
    pub line_total: i64,
}

/// One recipient's scheduled delivery
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GiftOrder {
    pub id: Uuid,
    pub company_id: Uuid,
    pub sender_email: String,
    pub recipient_email: String,
    pub items: Vec<GiftOrderItem>,
    pub total: i64,
    pub scheduled_date: NaiveDate,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
}
