use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;
use wiz_catalog::{quote, Room};
use wiz_shared::Currency;

use crate::checkout::CheckoutOrchestrator;
use crate::error::CheckoutError;

/// Longest a draft may be kept, whatever the configuration says.
const MAX_TTL_SECONDS: u64 = 7 * 24 * 60 * 60;

/// A priced stay on its way to checkout. Held in memory only and gone once
/// the booking is written or the guest wanders off.
#[derive(Debug, Clone, Serialize)]
pub struct ReservationDraft {
    pub id: Uuid,
    pub room: Room,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: u32,
    /// Nights shown to the guest (30 for monthly units)
    pub nights: u32,
    pub total_pesewas: i64,
    pub currency: Currency,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl ReservationDraft {
    pub fn new(
        room: &Room,
        check_in: NaiveDate,
        check_out: NaiveDate,
        guests: u32,
        ttl: Duration,
    ) -> Result<Self, CheckoutError> {
        if guests < 1 {
            return Err(CheckoutError::Validation("At least one guest is required.".to_string()));
        }
        if !room.is_available() {
            return Err(CheckoutError::Validation(format!(
                "{} is not available for booking.",
                room.name
            )));
        }

        let priced = quote(&room.rate, check_in, check_out);
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            room: room.clone(),
            check_in,
            check_out,
            guests,
            nights: priced.billed_nights,
            total_pesewas: priced.total_pesewas,
            currency: priced.currency,
            created_at: now,
            expires_at: now + ttl,
        })
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

pub struct DraftStore {
    drafts: RwLock<HashMap<Uuid, ReservationDraft>>,
    ttl: Duration,
}

impl DraftStore {
    pub fn new(ttl_seconds: u64) -> Self {
        let seconds = ttl_seconds.min(MAX_TTL_SECONDS) as i64;
        Self {
            drafts: RwLock::new(HashMap::new()),
            ttl: Duration::seconds(seconds),
        }
    }

    /// Prices the stay and keeps the draft until checkout picks it up.
    pub async fn open(
        &self,
        room: &Room,
        check_in: NaiveDate,
        check_out: NaiveDate,
        guests: u32,
    ) -> Result<ReservationDraft, CheckoutError> {
        let draft = ReservationDraft::new(room, check_in, check_out, guests, self.ttl)?;
        self.drafts.write().await.insert(draft.id, draft.clone());
        debug!("Draft {} opened for {}", draft.id, draft.room.id);
        Ok(draft)
    }

    /// The draft, if it exists and has not expired.
    pub async fn get(&self, id: Uuid) -> Option<ReservationDraft> {
        self.drafts
            .read()
            .await
            .get(&id)
            .filter(|d| !d.is_expired())
            .cloned()
    }

    pub async fn discard(&self, id: Uuid) -> bool {
        self.drafts.write().await.remove(&id).is_some()
    }

    pub async fn cleanup_expired(&self) -> usize {
        let mut drafts = self.drafts.write().await;
        let before = drafts.len();
        drafts.retain(|_, d| !d.is_expired());
        before - drafts.len()
    }

    pub async fn active_count(&self) -> usize {
        self.drafts.read().await.values().filter(|d| !d.is_expired()).count()
    }
}

/// Periodically drops drafts whose guests never reached payment, along with
/// the checkout state left behind for them.
pub async fn run_draft_sweeper(
    store: Arc<DraftStore>,
    checkout: Arc<CheckoutOrchestrator>,
    every: std::time::Duration,
) {
    info!("Draft sweeper started, interval {:?}", every);
    let mut ticker = tokio::time::interval(every);
    loop {
        ticker.tick().await;
        let removed = store.cleanup_expired().await;
        if removed > 0 {
            info!("Discarded {} abandoned reservation drafts", removed);
        }
        let pruned = checkout.prune_sessions().await;
        if pruned > 0 {
            debug!("Pruned {} idle checkout sessions", pruned);
        }
    }
}
