use async_trait::async_trait;

use crate::booking::{Booking, NewBooking};
use crate::identity::UserProfile;
use crate::BoxError;

/// Access to the `bookings` collection of the document store
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Write a booking keyed by its payment reference. Writing the same
    /// reference twice returns the booking stored by the first write.
    async fn record_booking(&self, booking: &NewBooking) -> Result<Booking, BoxError>;

    async fn find_by_reference(&self, reference: &str) -> Result<Option<Booking>, BoxError>;

    /// All bookings, newest first
    async fn list_recent(&self) -> Result<Vec<Booking>, BoxError>;

    /// Bookings made by one account, newest first
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Booking>, BoxError>;
}

/// Access to the `users` collection of the document store
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn get_profile(&self, uid: &str) -> Result<Option<UserProfile>, BoxError>;

    async fn put_profile(&self, profile: &UserProfile) -> Result<(), BoxError>;
}
