use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::time::Duration;
use wiz_core::{BoxError, PaymentGateway, TransactionStatus, VerifiedTransaction};
use wiz_shared::Currency;

use crate::StoreError;

/// Server side of the Paystack integration. The embedded widget runs in the
/// guest's browser; this client checks the widget script is reachable and
/// reads the transaction ledger to confirm what the widget reported.
pub struct PaystackGateway {
    http: reqwest::Client,
    base_url: String,
    script_url: String,
    secret_key: String,
}

impl PaystackGateway {
    pub fn new(base_url: &str, script_url: &str, secret_key: &str) -> Result<Self, StoreError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            script_url: script_url.to_string(),
            secret_key: secret_key.to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct VerifyEnvelope {
    status: bool,
    message: String,
    data: Option<VerifyData>,
}

#[derive(Debug, Deserialize)]
struct VerifyData {
    reference: String,
    status: String,
    amount: i64,
    currency: Currency,
    paid_at: Option<DateTime<Utc>>,
}

fn transaction_status(raw: &str) -> TransactionStatus {
    match raw {
        "success" => TransactionStatus::Success,
        "failed" | "reversed" => TransactionStatus::Failed,
        "abandoned" => TransactionStatus::Abandoned,
        _ => TransactionStatus::Pending,
    }
}

#[async_trait]
impl PaymentGateway for PaystackGateway {
    async fn is_ready(&self) -> bool {
        match self.http.head(&self.script_url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!("Gateway script not reachable yet: {}", e);
                false
            }
        }
    }

    async fn verify_transaction(&self, reference: &str) -> Result<VerifiedTransaction, BoxError> {
        let url = format!("{}/transaction/verify/{}", self.base_url, reference);
        let envelope: VerifyEnvelope = self
            .http
            .get(url)
            .bearer_auth(&self.secret_key)
            .send()
            .await?
            .json()
            .await?;

        let data = match (envelope.status, envelope.data) {
            (true, Some(data)) => data,
            _ => return Err(StoreError::Gateway(envelope.message).into()),
        };

        Ok(VerifiedTransaction {
            reference: data.reference,
            status: transaction_status(&data.status),
            amount: data.amount,
            currency: data.currency,
            paid_at: data.paid_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_payload_parses() {
        let body = r#"{
            "status": true,
            "message": "Verification successful",
            "data": {
                "reference": "GUEST-WIZ-1767225600000-1a2b3c4d",
                "status": "success",
                "amount": 400000,
                "currency": "GHS",
                "paid_at": "2026-12-01T10:00:00.000Z"
            }
        }"#;
        let envelope: VerifyEnvelope = serde_json::from_str(body).unwrap();
        let data = envelope.data.unwrap();
        assert_eq!(transaction_status(&data.status), TransactionStatus::Success);
        assert_eq!(data.amount, 400_000);
        assert_eq!(data.currency, Currency::Ghs);
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(transaction_status("abandoned"), TransactionStatus::Abandoned);
        assert_eq!(transaction_status("reversed"), TransactionStatus::Failed);
        assert_eq!(transaction_status("ongoing"), TransactionStatus::Pending);
    }
}
