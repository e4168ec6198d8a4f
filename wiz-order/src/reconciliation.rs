//! Bookings whose payment went through but whose write did not.
//!
//! The orchestrator parks them here; the worker re-checks each reference
//! against the gateway's ledger and retries the write. The write is keyed
//! by payment reference, so a retry that races a late original write still
//! leaves exactly one booking.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{error, info, warn};
use wiz_core::{BookingRepository, NewBooking, PaymentGateway, TransactionStatus};

#[derive(Debug, Clone)]
pub struct PendingBooking {
    pub booking: NewBooking,
    pub enqueued_at: DateTime<Utc>,
    pub attempts: u32,
}

#[derive(Default)]
pub struct ReconciliationQueue {
    pending: Mutex<HashMap<String, PendingBooking>>,
}

impl ReconciliationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn enqueue(&self, booking: NewBooking) {
        let reference = booking.payment_reference.clone();
        let mut pending = self.pending.lock().await;
        pending.entry(reference.clone()).or_insert_with(|| PendingBooking {
            booking,
            enqueued_at: Utc::now(),
            attempts: 0,
        });
        warn!("Booking {} queued for reconciliation ({} pending)", reference, pending.len());
    }

    pub async fn len(&self) -> usize {
        self.pending.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.pending.lock().await.is_empty()
    }

    pub async fn contains(&self, reference: &str) -> bool {
        self.pending.lock().await.contains_key(reference)
    }

    async fn snapshot(&self) -> Vec<PendingBooking> {
        self.pending.lock().await.values().cloned().collect()
    }

    async fn resolve(&self, reference: &str) {
        self.pending.lock().await.remove(reference);
    }

    async fn bump(&self, reference: &str) {
        if let Some(entry) = self.pending.lock().await.get_mut(reference) {
            entry.attempts += 1;
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    pub written: usize,
    pub dropped: usize,
    pub retained: usize,
}

pub struct ReconciliationWorker {
    queue: Arc<ReconciliationQueue>,
    gateway: Arc<dyn PaymentGateway>,
    bookings: Arc<dyn BookingRepository>,
}

impl ReconciliationWorker {
    pub fn new(
        queue: Arc<ReconciliationQueue>,
        gateway: Arc<dyn PaymentGateway>,
        bookings: Arc<dyn BookingRepository>,
    ) -> Self {
        Self { queue, gateway, bookings }
    }

    /// One pass over the queue.
    pub async fn sweep(&self) -> SweepReport {
        let mut report = SweepReport::default();

        for entry in self.queue.snapshot().await {
            let reference = entry.booking.payment_reference.as_str();

            let verified = match self.gateway.verify_transaction(reference).await {
                Ok(verified) => verified,
                Err(e) => {
                    warn!("Could not verify {} during reconciliation: {}", reference, e);
                    self.queue.bump(reference).await;
                    report.retained += 1;
                    continue;
                }
            };

            if verified.settles(entry.booking.total_pesewas) {
                match self.bookings.record_booking(&entry.booking).await {
                    Ok(booking) => {
                        info!("Reconciled payment {} into booking {}", reference, booking.id);
                        self.queue.resolve(reference).await;
                        report.written += 1;
                    }
                    Err(e) => {
                        error!("Reconciliation write for {} failed again: {}", reference, e);
                        self.queue.bump(reference).await;
                        report.retained += 1;
                    }
                }
                continue;
            }

            match verified.status {
                TransactionStatus::Failed | TransactionStatus::Abandoned => {
                    warn!("Dropping {}: gateway reports {:?}", reference, verified.status);
                    self.queue.resolve(reference).await;
                    report.dropped += 1;
                }
                TransactionStatus::Success => {
                    // Captured amount differs from the quoted total; needs a human.
                    error!(
                        "Payment {} captured {} but booking expects {}",
                        reference, verified.amount, entry.booking.total_pesewas
                    );
                    self.queue.bump(reference).await;
                    report.retained += 1;
                }
                TransactionStatus::Pending => {
                    self.queue.bump(reference).await;
                    report.retained += 1;
                }
            }
        }

        report
    }

    pub async fn run(self, every: Duration) {
        info!("Reconciliation worker started, interval {:?}", every);
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            if self.queue.is_empty().await {
                continue;
            }
            let report = self.sweep().await;
            info!(
                "Reconciliation sweep: {} written, {} dropped, {} still pending",
                report.written, report.dropped, report.retained
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkout::MockPaymentGateway;
    use chrono::NaiveDate;
    use wiz_core::booking::{ANONYMOUS_USER, GATEWAY_LABEL};
    use wiz_core::BookingStatus;
    use wiz_shared::{Currency, Masked};
    use wiz_store::memory::MemoryBookingRepository;

    fn paid(reference: &str) -> NewBooking {
        NewBooking {
            user_id: ANONYMOUS_USER.to_string(),
            guest_name: "Kofi Mensah".to_string(),
            guest_email: Masked::new("kofi@example.com".to_string()),
            guest_phone: Masked::new("+233240000000".to_string()),
            room_name: "WIZ Short Stay Apartment".to_string(),
            check_in: NaiveDate::from_ymd_opt(2026, 12, 1).unwrap(),
            check_out: NaiveDate::from_ymd_opt(2026, 12, 5).unwrap(),
            guests: 1,
            total_pesewas: 400_000,
            currency: Currency::Ghs,
            status: BookingStatus::Confirmed,
            payment_reference: reference.to_string(),
            gateway: GATEWAY_LABEL.to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_sweep_writes_settled_payments() {
        let queue = Arc::new(ReconciliationQueue::new());
        let gateway = Arc::new(MockPaymentGateway::new(true));
        let bookings = Arc::new(MemoryBookingRepository::new());

        gateway.settle("GUEST-WIZ-1", 400_000).await;
        queue.enqueue(paid("GUEST-WIZ-1")).await;
        queue.enqueue(paid("GUEST-WIZ-1")).await;
        assert_eq!(queue.len().await, 1);

        let worker = ReconciliationWorker::new(queue.clone(), gateway, bookings.clone());
        let report = worker.sweep().await;

        assert_eq!(report, SweepReport { written: 1, dropped: 0, retained: 0 });
        assert!(queue.is_empty().await);
        assert_eq!(bookings.len().await, 1);
    }

    #[tokio::test]
    async fn test_sweep_drops_failed_and_keeps_unsettled() {
        let queue = Arc::new(ReconciliationQueue::new());
        let gateway = Arc::new(MockPaymentGateway::new(true));
        let bookings = Arc::new(MemoryBookingRepository::new());

        gateway.decline("GUEST-WIZ-FAILED").await;
        queue.enqueue(paid("GUEST-WIZ-FAILED")).await;
        queue.enqueue(paid("GUEST-WIZ-UNKNOWN")).await;

        let worker = ReconciliationWorker::new(queue.clone(), gateway, bookings.clone());
        let report = worker.sweep().await;

        assert_eq!(report.dropped, 1);
        assert_eq!(report.retained, 1);
        assert!(queue.contains("GUEST-WIZ-UNKNOWN").await);
        assert!(bookings.is_empty().await);
    }

    #[tokio::test]
    async fn test_sweep_retains_while_store_is_down() {
        let queue = Arc::new(ReconciliationQueue::new());
        let gateway = Arc::new(MockPaymentGateway::new(true));
        let bookings = Arc::new(MemoryBookingRepository::new());
        bookings.set_fail_writes(true);

        gateway.settle("GUEST-WIZ-2", 400_000).await;
        queue.enqueue(paid("GUEST-WIZ-2")).await;

        let worker = ReconciliationWorker::new(queue.clone(), gateway, bookings.clone());
        assert_eq!(worker.sweep().await.retained, 1);

        bookings.set_fail_writes(false);
        assert_eq!(worker.sweep().await.written, 1);
        assert!(queue.is_empty().await);
    }
}
