use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use wiz_shared::Currency;

use crate::BoxError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CustomField {
    pub display_name: String,
    pub variable_name: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaymentMetadata {
    pub custom_fields: Vec<CustomField>,
}

/// Setup payload for the gateway's embedded checkout widget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRequest {
    /// Public (publishable) key of the merchant account
    pub key: String,
    pub email: String,
    /// Amount in the currency's smallest unit (pesewas)
    pub amount: i64,
    pub currency: Currency,
    #[serde(rename = "ref")]
    pub reference: String,
    pub metadata: PaymentMetadata,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Success,
    Failed,
    Abandoned,
    Pending,
}

/// The gateway's own record of a transaction, looked up by reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifiedTransaction {
    pub reference: String,
    pub status: TransactionStatus,
    pub amount: i64,
    pub currency: Currency,
    pub paid_at: Option<DateTime<Utc>>,
}

impl VerifiedTransaction {
    /// True when the gateway captured exactly `amount`.
    pub fn settles(&self, amount: i64) -> bool {
        self.status == TransactionStatus::Success && self.amount == amount
    }
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Whether the gateway's checkout script can be loaded
    async fn is_ready(&self) -> bool;

    /// Look a transaction up in the gateway's ledger
    async fn verify_transaction(&self, reference: &str) -> Result<VerifiedTransaction, BoxError>;
}
