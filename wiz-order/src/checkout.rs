use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};
use uuid::Uuid;
use wiz_core::booking::{ANONYMOUS_USER, GATEWAY_LABEL};
use wiz_core::payment::{CustomField, PaymentMetadata};
use wiz_core::{
    AuthUser, Booking, BookingRepository, BookingStatus, BoxError, NewBooking, PaymentGateway, PaymentRequest,
    TransactionStatus, VerifiedTransaction,
};
use wiz_shared::{Currency, Masked};

use crate::draft::{DraftStore, ReservationDraft};
use crate::error::CheckoutError;
use crate::readiness::GatewayReadiness;
use crate::reconciliation::ReconciliationQueue;

const REFERENCE_PREFIX: &str = "GUEST-WIZ";

/// Contact fields collected on the checkout form.
#[derive(Debug, Clone, Deserialize)]
pub struct GuestIdentity {
    pub full_name: String,
    pub email: String,
    pub phone: String,
}

/// A guest identity that passed validation: every field trimmed and present.
#[derive(Debug, Clone)]
pub struct VerifiedGuest {
    pub full_name: String,
    pub email: Masked<String>,
    pub phone: Masked<String>,
}

impl GuestIdentity {
    pub fn validate(&self) -> Result<VerifiedGuest, CheckoutError> {
        let full_name = self.full_name.trim();
        let email = self.email.trim();
        let phone = self.phone.trim();
        if full_name.is_empty() || email.is_empty() || phone.is_empty() {
            return Err(CheckoutError::incomplete_identity());
        }
        Ok(VerifiedGuest {
            full_name: full_name.to_string(),
            email: Masked::new(email.to_string()),
            phone: Masked::new(phone.to_string()),
        })
    }
}

/// What the gateway widget reported back to the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentOutcome {
    Success,
    Closed,
}

/// Checkout progress for one draft, as the checkout view shows it.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CheckoutSession {
    /// Set while a payment or the booking write is outstanding
    pub processing: bool,
    pub last_error: Option<String>,
    pub pending_reference: Option<String>,
    #[serde(skip)]
    open: Option<OpenPayment>,
}

#[derive(Debug, Clone)]
struct OpenPayment {
    reference: String,
    amount: i64,
    guest: VerifiedGuest,
    user_id: String,
    draft: ReservationDraft,
}

impl OpenPayment {
    fn booking(&self) -> NewBooking {
        NewBooking {
            user_id: self.user_id.clone(),
            guest_name: self.guest.full_name.clone(),
            guest_email: self.guest.email.clone(),
            guest_phone: self.guest.phone.clone(),
            room_name: self.draft.room.name.clone(),
            check_in: self.draft.check_in,
            check_out: self.draft.check_out,
            guests: self.draft.guests,
            total_pesewas: self.draft.total_pesewas,
            currency: self.draft.currency,
            status: BookingStatus::Confirmed,
            payment_reference: self.reference.clone(),
            gateway: GATEWAY_LABEL.to_string(),
            created_at: Utc::now(),
        }
    }
}

/// Shown on the success view.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Confirmation {
    pub booking_id: String,
    pub room_name: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: u32,
    pub total_pesewas: i64,
    pub currency: Currency,
    pub reference: String,
    pub guest_name: String,
}

impl From<&Booking> for Confirmation {
    fn from(booking: &Booking) -> Self {
        Self {
            booking_id: booking.id.clone(),
            room_name: booking.room_name.clone(),
            check_in: booking.check_in,
            check_out: booking.check_out,
            guests: booking.guests,
            total_pesewas: booking.total_pesewas,
            currency: booking.currency,
            reference: booking.payment_reference.clone(),
            guest_name: booking.guest_name.clone(),
        }
    }
}

/// `GUEST-WIZ-<unix millis>-<8 hex chars>`
pub fn payment_reference() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}-{}-{}", REFERENCE_PREFIX, Utc::now().timestamp_millis(), &suffix[..8])
}

pub struct CheckoutOrchestrator {
    public_key: String,
    gateway: Arc<dyn PaymentGateway>,
    readiness: GatewayReadiness,
    bookings: Arc<dyn BookingRepository>,
    drafts: Arc<DraftStore>,
    reconciliation: Arc<ReconciliationQueue>,
    sessions: Mutex<HashMap<Uuid, CheckoutSession>>,
}

impl CheckoutOrchestrator {
    pub fn new(
        public_key: String,
        gateway: Arc<dyn PaymentGateway>,
        readiness: GatewayReadiness,
        bookings: Arc<dyn BookingRepository>,
        drafts: Arc<DraftStore>,
        reconciliation: Arc<ReconciliationQueue>,
    ) -> Self {
        Self {
            public_key,
            gateway,
            readiness,
            bookings,
            drafts,
            reconciliation,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn gateway_ready(&self) -> bool {
        self.readiness.is_ready()
    }

    pub async fn session(&self, draft_id: Uuid) -> CheckoutSession {
        self.sessions
            .lock()
            .await
            .get(&draft_id)
            .cloned()
            .unwrap_or_default()
    }

    async fn record_error(&self, draft_id: Uuid, err: &CheckoutError) {
        let mut sessions = self.sessions.lock().await;
        let session = sessions.entry(draft_id).or_default();
        session.last_error = Some(err.to_string());
    }

    /// Validates the guest and opens a payment for the draft. The returned
    /// request is what the gateway's embedded widget is set up with.
    pub async fn initiate(
        &self,
        draft_id: Uuid,
        identity: &GuestIdentity,
        user: Option<&AuthUser>,
    ) -> Result<PaymentRequest, CheckoutError> {
        let draft = self.drafts.get(draft_id).await.ok_or(CheckoutError::DraftNotFound)?;

        let guest = match identity.validate() {
            Ok(guest) => guest,
            Err(e) => {
                self.record_error(draft_id, &e).await;
                return Err(e);
            }
        };

        if !self.readiness.is_ready() {
            let e = CheckoutError::GatewayNotReady;
            self.record_error(draft_id, &e).await;
            return Err(e);
        }

        let mut sessions = self.sessions.lock().await;
        let session = sessions.entry(draft_id).or_default();
        if session.processing {
            return Err(CheckoutError::PaymentInProgress);
        }

        let reference = payment_reference();
        let request = PaymentRequest {
            key: self.public_key.clone(),
            email: guest.email.expose().clone(),
            amount: draft.total_pesewas,
            currency: draft.currency,
            reference: reference.clone(),
            metadata: PaymentMetadata {
                custom_fields: vec![
                    CustomField {
                        display_name: "Guest Name".to_string(),
                        variable_name: "guest_name".to_string(),
                        value: guest.full_name.clone(),
                    },
                    CustomField {
                        display_name: "Phone Number".to_string(),
                        variable_name: "phone_number".to_string(),
                        value: guest.phone.expose().clone(),
                    },
                ],
            },
        };

        info!(
            "Payment {} opened for draft {} ({} pesewas, guest {})",
            reference, draft_id, draft.total_pesewas, guest.email
        );

        session.processing = true;
        session.last_error = None;
        session.pending_reference = Some(reference.clone());
        session.open = Some(OpenPayment {
            reference,
            amount: draft.total_pesewas,
            guest,
            user_id: user.map(|u| u.uid.clone()).unwrap_or_else(|| ANONYMOUS_USER.to_string()),
            draft,
        });

        Ok(request)
    }

    /// Handles the widget's callback for `reference`.
    pub async fn complete(
        &self,
        draft_id: Uuid,
        reference: &str,
        outcome: PaymentOutcome,
    ) -> Result<Confirmation, CheckoutError> {
        let open = {
            let sessions = self.sessions.lock().await;
            sessions
                .get(&draft_id)
                .and_then(|s| s.open.clone())
                .filter(|o| o.reference == reference)
        };

        let Some(open) = open else {
            // A replayed success callback finds the booking already written.
            if outcome == PaymentOutcome::Success {
                if let Ok(Some(booking)) = self.bookings.find_by_reference(reference).await {
                    return Ok(Confirmation::from(&booking));
                }
            }
            return Err(CheckoutError::NoOpenPayment);
        };

        if outcome == PaymentOutcome::Closed {
            info!("Payment window closed for {}", reference);
            return Err(self.close(draft_id, CheckoutError::PaymentWindowClosed).await);
        }

        let verified = match self.gateway.verify_transaction(reference).await {
            Ok(verified) => verified,
            Err(e) => {
                // The guest may well have paid; let the sweep settle it.
                error!("Verification of {} failed: {}", reference, e);
                self.reconciliation.enqueue(open.booking()).await;
                return Err(self.close(draft_id, CheckoutError::Gateway(e.to_string())).await);
            }
        };

        if !verified.settles(open.amount) {
            warn!(
                "Payment {} not settled: {:?}, {} of {} pesewas",
                reference, verified.status, verified.amount, open.amount
            );
            let reference = reference.to_string();
            let err = match verified.status {
                TransactionStatus::Failed | TransactionStatus::Abandoned => {
                    let reason = format!("transaction is {:?}", verified.status).to_lowercase();
                    CheckoutError::GatewayRejected(reason)
                }
                TransactionStatus::Pending => {
                    self.reconciliation.enqueue(open.booking()).await;
                    CheckoutError::PaymentUnconfirmed { reference }
                }
                TransactionStatus::Success => {
                    self.reconciliation.enqueue(open.booking()).await;
                    CheckoutError::AmountMismatch { reference }
                }
            };
            return Err(self.close(draft_id, err).await);
        }

        let new_booking = open.booking();
        match self.bookings.record_booking(&new_booking).await {
            Ok(booking) => {
                info!("Booking {} confirmed for payment {}", booking.id, reference);
                self.drafts.discard(draft_id).await;
                self.sessions.lock().await.remove(&draft_id);
                Ok(Confirmation::from(&booking))
            }
            Err(e) => {
                error!("Booking write failed after payment {}: {}", reference, e);
                self.reconciliation.enqueue(new_booking).await;
                let err = CheckoutError::StorageAfterPayment { reference: reference.to_string() };
                Err(self.close(draft_id, err).await)
            }
        }
    }

    /// Drops checkout state for drafts that are gone and have no payment open.
    pub async fn prune_sessions(&self) -> usize {
        let idle: Vec<Uuid> = {
            let sessions = self.sessions.lock().await;
            sessions
                .iter()
                .filter(|(_, s)| s.open.is_none())
                .map(|(id, _)| *id)
                .collect()
        };

        let mut gone = Vec::new();
        for id in idle {
            if self.drafts.get(id).await.is_none() {
                gone.push(id);
            }
        }

        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        for id in gone {
            if sessions.get(&id).is_some_and(|s| s.open.is_none()) {
                sessions.remove(&id);
            }
        }
        before - sessions.len()
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// Ends the open payment, keeping the draft so the guest can retry.
    async fn close(&self, draft_id: Uuid, err: CheckoutError) -> CheckoutError {
        let mut sessions = self.sessions.lock().await;
        let session = sessions.entry(draft_id).or_default();
        session.processing = false;
        session.open = None;
        session.last_error = Some(err.to_string());
        err
    }
}

/// Stand-in gateway for tests and local runs without gateway keys.
pub struct MockPaymentGateway {
    ready: AtomicBool,
    fail_verify: AtomicBool,
    verify_calls: AtomicUsize,
    ledger: Mutex<HashMap<String, (TransactionStatus, i64)>>,
}

impl MockPaymentGateway {
    pub fn new(ready: bool) -> Self {
        Self {
            ready: AtomicBool::new(ready),
            fail_verify: AtomicBool::new(false),
            verify_calls: AtomicUsize::new(0),
            ledger: Mutex::new(HashMap::new()),
        }
    }

    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    pub fn set_fail_verify(&self, fail: bool) {
        self.fail_verify.store(fail, Ordering::SeqCst);
    }

    pub fn verify_calls(&self) -> usize {
        self.verify_calls.load(Ordering::SeqCst)
    }

    /// Records a successful capture of `amount` for `reference`.
    pub async fn settle(&self, reference: &str, amount: i64) {
        self.ledger
            .lock()
            .await
            .insert(reference.to_string(), (TransactionStatus::Success, amount));
    }

    pub async fn decline(&self, reference: &str) {
        self.ledger
            .lock()
            .await
            .insert(reference.to_string(), (TransactionStatus::Failed, 0));
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    async fn verify_transaction(&self, reference: &str) -> Result<VerifiedTransaction, BoxError> {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_verify.load(Ordering::SeqCst) {
            return Err("Simulated gateway outage".into());
        }

        let (status, amount) = self
            .ledger
            .lock()
            .await
            .get(reference)
            .copied()
            .unwrap_or((TransactionStatus::Pending, 0));

        Ok(VerifiedTransaction {
            reference: reference.to_string(),
            status,
            amount,
            currency: Currency::Ghs,
            paid_at: (status == TransactionStatus::Success).then(Utc::now),
        })
    }
}
