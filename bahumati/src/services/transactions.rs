//! Transaction service.
//!
//! The backend exposes only the flat admin listing; by-id lookup is
//! fetch-all-then-filter (documented fallback, preserved as-is).

use crate::client::{ApiClient, ServiceResult};
use crate::models::{Transaction, TransactionStatus, TransactionType};
use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Clone)]
pub struct TransactionService {
    api: ApiClient,
}

impl TransactionService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// `GET /admin/transactions` — newest first.
    pub async fn list(&self) -> ServiceResult<Vec<Transaction>> {
        let response: ListTransactionsResponse = self.api.get("/admin/transactions").await?;
        let mut transactions: Vec<Transaction> =
            response.data.into_iter().map(map_transaction).collect();
        transactions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(transactions)
    }

    pub async fn get_by_id(&self, id: &str) -> ServiceResult<Option<Transaction>> {
        Ok(self.list().await?.into_iter().find(|t| t.id == id))
    }
}

#[derive(Debug, Deserialize)]
struct ListTransactionsResponse {
    #[allow(dead_code)]
    success: bool,
    data: Vec<TransactionWire>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionWire {
    #[serde(rename = "_id", alias = "id")]
    id: String,
    user_id: String,
    #[serde(default)]
    event_id: Option<String>,
    #[serde(rename = "type")]
    tx_type: TransactionType,
    amount: f64,
    #[serde(default = "default_currency")]
    currency: String,
    status: TransactionStatus,
    created_at: DateTime<Utc>,
    #[serde(default)]
    processed_at: Option<DateTime<Utc>>,
}

fn default_currency() -> String {
    "INR".to_string()
}

fn map_transaction(wire: TransactionWire) -> Transaction {
    Transaction {
        id: wire.id,
        user_id: wire.user_id,
        event_id: wire.event_id,
        tx_type: wire.tx_type,
        amount: wire.amount,
        currency: wire.currency,
        status: wire.status,
        created_at: wire.created_at,
        processed_at: wire.processed_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_wire_maps_type_and_defaults_currency() {
        let wire: TransactionWire = serde_json::from_value(serde_json::json!({
            "_id": "tx1",
            "userId": "u2",
            "eventId": "e1",
            "type": "allocation",
            "amount": 20000.0,
            "status": "completed",
            "createdAt": "2023-11-02T12:00:00Z"
        }))
        .unwrap();
        let tx = map_transaction(wire);
        assert_eq!(tx.tx_type, TransactionType::Allocation);
        assert_eq!(tx.status, TransactionStatus::Completed);
        assert_eq!(tx.currency, "INR");
        assert_eq!(tx.event_id.as_deref(), Some("e1"));
    }

    #[test]
    fn unknown_transaction_type_is_a_parse_error() {
        let body = serde_json::json!({
            "_id": "tx2",
            "userId": "u1",
            "type": "chargeback",
            "amount": 1.0,
            "status": "pending",
            "createdAt": "2023-11-02T12:00:00Z"
        });
        assert!(serde_json::from_value::<TransactionWire>(body).is_err());
    }
}
