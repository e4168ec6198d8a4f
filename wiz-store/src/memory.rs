//! In-process stores for tests and local development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;
use wiz_core::{
    Booking, BookingRepository, BoxError, ClientId, FlagKey, FlagStore, NewBooking, ProfileRepository,
    UserProfile,
};

#[derive(Default)]
pub struct MemoryBookingRepository {
    bookings: RwLock<Vec<Booking>>,
    fail_writes: AtomicBool,
}

impl MemoryBookingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent write fail, to simulate an unreachable store.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.bookings.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.bookings.read().await.is_empty()
    }
}

fn newest_first(mut bookings: Vec<Booking>) -> Vec<Booking> {
    // Stored in insertion order; reverse first so equal timestamps keep newest first.
    bookings.reverse();
    bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    bookings
}

#[async_trait]
impl BookingRepository for MemoryBookingRepository {
    async fn record_booking(&self, booking: &NewBooking) -> Result<Booking, BoxError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err("document store unavailable".into());
        }

        let mut bookings = self.bookings.write().await;
        if let Some(existing) = bookings
            .iter()
            .find(|b| b.payment_reference == booking.payment_reference)
        {
            return Ok(existing.clone());
        }

        let stored = booking.clone().with_id(Uuid::new_v4().simple().to_string());
        bookings.push(stored.clone());
        Ok(stored)
    }

    async fn find_by_reference(&self, reference: &str) -> Result<Option<Booking>, BoxError> {
        let bookings = self.bookings.read().await;
        Ok(bookings.iter().find(|b| b.payment_reference == reference).cloned())
    }

    async fn list_recent(&self) -> Result<Vec<Booking>, BoxError> {
        Ok(newest_first(self.bookings.read().await.clone()))
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Booking>, BoxError> {
        let bookings = self.bookings.read().await;
        Ok(newest_first(
            bookings.iter().filter(|b| b.user_id == user_id).cloned().collect(),
        ))
    }
}

#[derive(Default)]
pub struct MemoryProfileRepository {
    profiles: RwLock<HashMap<String, UserProfile>>,
}

impl MemoryProfileRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProfileRepository for MemoryProfileRepository {
    async fn get_profile(&self, uid: &str) -> Result<Option<UserProfile>, BoxError> {
        Ok(self.profiles.read().await.get(uid).cloned())
    }

    async fn put_profile(&self, profile: &UserProfile) -> Result<(), BoxError> {
        self.profiles
            .write()
            .await
            .insert(profile.uid.clone(), profile.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryFlagStore {
    flags: RwLock<HashMap<(ClientId, FlagKey), String>>,
}

impl MemoryFlagStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FlagStore for MemoryFlagStore {
    async fn get_flag(&self, client: &ClientId, key: FlagKey) -> Result<Option<String>, BoxError> {
        Ok(self.flags.read().await.get(&(client.clone(), key)).cloned())
    }

    async fn set_flag(&self, client: &ClientId, key: FlagKey, value: &str) -> Result<(), BoxError> {
        self.flags
            .write()
            .await
            .insert((client.clone(), key), value.to_string());
        Ok(())
    }

    async fn clear_flag(&self, client: &ClientId, key: FlagKey) -> Result<(), BoxError> {
        self.flags.write().await.remove(&(client.clone(), key));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, Utc};
    use wiz_core::booking::{ANONYMOUS_USER, GATEWAY_LABEL};
    use wiz_core::BookingStatus;
    use wiz_shared::{Currency, Masked};

    fn new_booking(reference: &str, user_id: &str, minutes_ago: i64) -> NewBooking {
        NewBooking {
            user_id: user_id.to_string(),
            guest_name: "Alexander Wiz".to_string(),
            guest_email: Masked::new("alex@example.com".to_string()),
            guest_phone: Masked::new("+233200000000".to_string()),
            room_name: "WIZ Short Stay Apartment".to_string(),
            check_in: NaiveDate::from_ymd_opt(2026, 12, 1).unwrap(),
            check_out: NaiveDate::from_ymd_opt(2026, 12, 5).unwrap(),
            guests: 2,
            total_pesewas: 400_000,
            currency: Currency::Ghs,
            status: BookingStatus::Confirmed,
            payment_reference: reference.to_string(),
            gateway: GATEWAY_LABEL.to_string(),
            created_at: Utc::now() - Duration::minutes(minutes_ago),
        }
    }

    #[tokio::test]
    async fn test_record_is_idempotent_per_reference() {
        let repo = MemoryBookingRepository::new();

        let first = repo.record_booking(&new_booking("GUEST-WIZ-1", ANONYMOUS_USER, 0)).await.unwrap();
        let replay = repo.record_booking(&new_booking("GUEST-WIZ-1", ANONYMOUS_USER, 0)).await.unwrap();

        assert_eq!(first.id, replay.id);
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn test_listing_is_newest_first() {
        let repo = MemoryBookingRepository::new();
        repo.record_booking(&new_booking("A", "u1", 30)).await.unwrap();
        repo.record_booking(&new_booking("B", "u2", 10)).await.unwrap();
        repo.record_booking(&new_booking("C", "u1", 20)).await.unwrap();

        let refs: Vec<_> = repo
            .list_recent()
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.payment_reference)
            .collect();
        assert_eq!(refs, vec!["B", "C", "A"]);

        let mine = repo.list_for_user("u1").await.unwrap();
        assert_eq!(mine.len(), 2);
        assert_eq!(mine[0].payment_reference, "C");
    }

    #[tokio::test]
    async fn test_failing_writes() {
        let repo = MemoryBookingRepository::new();
        repo.set_fail_writes(true);
        assert!(repo.record_booking(&new_booking("X", "u1", 0)).await.is_err());
        assert!(repo.is_empty().await);
    }

    #[tokio::test]
    async fn test_flags_are_scoped_per_client() {
        let flags = MemoryFlagStore::new();
        let a = ClientId::parse("browser-a").unwrap();
        let b = ClientId::parse("browser-b").unwrap();

        flags.set_flag(&a, FlagKey::AdminSession, "1").await.unwrap();
        assert_eq!(flags.get_flag(&a, FlagKey::AdminSession).await.unwrap().as_deref(), Some("1"));
        assert_eq!(flags.get_flag(&b, FlagKey::AdminSession).await.unwrap(), None);

        flags.clear_flag(&a, FlagKey::AdminSession).await.unwrap();
        assert_eq!(flags.get_flag(&a, FlagKey::AdminSession).await.unwrap(), None);
    }
}
