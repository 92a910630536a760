//! Supplier adapter capability
//!
//! Provides a unified interface over supplier integrations. An adapter owns
//! credential validation and wire-format normalization; the transport behind
//! it is a separate [`RecordFeed`] capability so the engine never depends on
//! a concrete client.

use crate::errors::{AppError, Result};
use crate::models::{RemoteProduct, Supplier, SupplierCredentials};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Trait for supplier record retrieval and normalization
#[async_trait]
pub trait SupplierAdapter: Send + Sync {
    /// True iff the required credentials are present and well-formed
    fn is_configured(&self) -> bool;

    /// Fetch raw remote records: the full catalog, or the given SKU subset
    async fn fetch_records(&self, skus: Option<&[String]>) -> Result<Vec<Value>>;

    /// Normalize one raw record. Failures are per-record and isolatable.
    fn parse_record(&self, raw: &Value) -> Result<RemoteProduct>;
}

/// Transport capability behind an adapter.
///
/// Production transports live outside this crate; [`StaticFeed`] is the
/// in-memory implementation used by tests and manual snapshots.
#[async_trait]
pub trait RecordFeed: Send + Sync {
    async fn fetch(&self, skus: Option<&[String]>) -> Result<Vec<Value>>;
}

/// In-memory record feed
#[derive(Default)]
pub struct StaticFeed {
    records: Vec<Value>,
}

impl StaticFeed {
    pub fn new(records: Vec<Value>) -> Self {
        Self { records }
    }
}

#[async_trait]
impl RecordFeed for StaticFeed {
    async fn fetch(&self, skus: Option<&[String]>) -> Result<Vec<Value>> {
        let records = match skus {
            None => self.records.clone(),
            Some(skus) => self
                .records
                .iter()
                .filter(|r| {
                    r.get("codigo")
                        .and_then(Value::as_str)
                        .map(|sku| skus.iter().any(|s| s == sku))
                        .unwrap_or(false)
                })
                .cloned()
                .collect(),
        };
        Ok(records)
    }
}

/// Adapter for the SpotBrindes supplier API.
///
/// SpotBrindes records carry pt-BR field names (`codigo`, `nome`,
/// `categoria`, `descricao`, `preco`, `estoque`, `ncm`); this adapter maps
/// them onto catalog terms.
pub struct SpotBrindesAdapter {
    credentials: SupplierCredentials,
    feed: Arc<dyn RecordFeed>,
}

impl SpotBrindesAdapter {
    pub fn new(credentials: SupplierCredentials, feed: Arc<dyn RecordFeed>) -> Self {
        Self { credentials, feed }
    }
}

#[async_trait]
impl SupplierAdapter for SpotBrindesAdapter {
    fn is_configured(&self) -> bool {
        let url_ok = self
            .credentials
            .api_url
            .as_deref()
            .map(|u| u.starts_with("http://") || u.starts_with("https://"))
            .unwrap_or(false);
        let key_ok = self
            .credentials
            .api_key
            .as_deref()
            .map(|k| !k.trim().is_empty())
            .unwrap_or(false);
        url_ok && key_ok
    }

    async fn fetch_records(&self, skus: Option<&[String]>) -> Result<Vec<Value>> {
        self.feed.fetch(skus).await
    }

    fn parse_record(&self, raw: &Value) -> Result<RemoteProduct> {
        let obj = raw.as_object().ok_or_else(|| AppError::InvalidFormat {
            message: "supplier record is not an object".into(),
        })?;

        let sku = obj
            .get("codigo")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::InvalidFormat {
                message: "supplier record has no codigo".into(),
            })?
            .to_string();

        let price = match obj.get("preco") {
            None | Some(Value::Null) => None,
            Some(v) => Some(as_points(v).ok_or_else(|| AppError::InvalidFormat {
                message: format!("record {sku}: preco is not a non-negative number"),
            })?),
        };
        let stock = match obj.get("estoque") {
            None | Some(Value::Null) => None,
            Some(v) => Some(v.as_i64().filter(|s| *s >= 0).ok_or_else(|| {
                AppError::InvalidFormat {
                    message: format!("record {sku}: estoque is not a non-negative integer"),
                }
            })?),
        };

        Ok(RemoteProduct {
            sku,
            name: string_field(obj, "nome"),
            category: string_field(obj, "categoria"),
            description: string_field(obj, "descricao"),
            price,
            stock,
            ncm: string_field(obj, "ncm"),
        })
    }
}

fn string_field(obj: &serde_json::Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Points from a `preco` value; fractional prices are rejected
fn as_points(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                (i >= 0).then_some(i)
            } else {
                let f = n.as_f64()?;
                (f >= 0.0 && f.fract() == 0.0).then_some(f as i64)
            }
        }
        _ => None,
    }
}

/// Build the adapter for a SpotBrindes supplier over the given feed
pub fn spot_brindes_adapter(
    supplier: &Supplier,
    feed: Arc<dyn RecordFeed>,
) -> Arc<dyn SupplierAdapter> {
    Arc::new(SpotBrindesAdapter::new(supplier.credentials.clone(), feed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn configured() -> SupplierCredentials {
        SupplierCredentials {
            api_url: Some("https://api.spotbrindes.com.br/v1".into()),
            api_key: Some("token".into()),
        }
    }

    #[test]
    fn test_is_configured() {
        let feed: Arc<dyn RecordFeed> = Arc::new(StaticFeed::default());
        let adapter = SpotBrindesAdapter::new(configured(), feed.clone());
        assert!(adapter.is_configured());

        let adapter = SpotBrindesAdapter::new(
            SupplierCredentials {
                api_url: Some("ftp://wrong".into()),
                api_key: Some("token".into()),
            },
            feed.clone(),
        );
        assert!(!adapter.is_configured());

        let adapter = SpotBrindesAdapter::new(SupplierCredentials::default(), feed);
        assert!(!adapter.is_configured());
    }

    #[test]
    fn test_parse_record_maps_localized_fields() {
        let feed: Arc<dyn RecordFeed> = Arc::new(StaticFeed::default());
        let adapter = SpotBrindesAdapter::new(configured(), feed);

        let remote = adapter
            .parse_record(&json!({
                "codigo": "SPT-10",
                "nome": "Caneca",
                "categoria": "Drinkware",
                "descricao": "Caneca de inox",
                "preco": 45,
                "estoque": 120,
                "ncm": "6912.00.00"
            }))
            .unwrap();

        assert_eq!(remote.sku, "SPT-10");
        assert_eq!(remote.name.as_deref(), Some("Caneca"));
        assert_eq!(remote.price, Some(45));
        assert_eq!(remote.stock, Some(120));
        assert_eq!(remote.ncm.as_deref(), Some("6912.00.00"));
    }

    #[test]
    fn test_parse_record_rejects_missing_sku_and_bad_price() {
        let feed: Arc<dyn RecordFeed> = Arc::new(StaticFeed::default());
        let adapter = SpotBrindesAdapter::new(configured(), feed);

        let err = adapter.parse_record(&json!({"nome": "Caneca"})).unwrap_err();
        assert!(matches!(err, AppError::InvalidFormat { .. }));

        let err = adapter
            .parse_record(&json!({"codigo": "SPT-1", "preco": "caro"}))
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidFormat { .. }));

        let err = adapter
            .parse_record(&json!({"codigo": "SPT-1", "estoque": -4}))
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidFormat { .. }));
    }

    #[tokio::test]
    async fn test_static_feed_subset() {
        let feed = StaticFeed::new(vec![
            json!({"codigo": "A", "nome": "A"}),
            json!({"codigo": "B", "nome": "B"}),
        ]);

        let all = feed.fetch(None).await.unwrap();
        assert_eq!(all.len(), 2);

        let subset = feed.fetch(Some(&["B".to_string()])).await.unwrap();
        assert_eq!(subset.len(), 1);
        assert_eq!(subset[0]["codigo"], "B");
    }
}
