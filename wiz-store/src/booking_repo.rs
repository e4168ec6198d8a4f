use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;
use wiz_core::{Booking, BookingRepository, BookingStatus, BoxError, NewBooking};
use wiz_shared::{Currency, Masked};

use crate::StoreError;

const BOOKING_COLUMNS: &str = "id, user_id, guest_name, guest_email, guest_phone, room_name, \
     check_in, check_out, guests, total_pesewas, currency, status, payment_reference, gateway, created_at";

pub struct PgBookingRepository {
    pool: PgPool,
}

impl PgBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: String,
    user_id: String,
    guest_name: String,
    guest_email: String,
    guest_phone: String,
    room_name: String,
    check_in: NaiveDate,
    check_out: NaiveDate,
    guests: i32,
    total_pesewas: i64,
    currency: String,
    status: String,
    payment_reference: String,
    gateway: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = StoreError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        let status = BookingStatus::parse(&row.status)
            .ok_or_else(|| StoreError::Corrupt(format!("booking {} has status {:?}", row.id, row.status)))?;
        let guests = u32::try_from(row.guests)
            .map_err(|_| StoreError::Corrupt(format!("booking {} has {} guests", row.id, row.guests)))?;
        if row.currency != Currency::Ghs.code() {
            return Err(StoreError::Corrupt(format!("booking {} has currency {}", row.id, row.currency)));
        }

        Ok(Booking {
            id: row.id,
            user_id: row.user_id,
            guest_name: row.guest_name,
            guest_email: Masked::new(row.guest_email),
            guest_phone: Masked::new(row.guest_phone),
            room_name: row.room_name,
            check_in: row.check_in,
            check_out: row.check_out,
            guests,
            total_pesewas: row.total_pesewas,
            currency: Currency::Ghs,
            status,
            payment_reference: row.payment_reference,
            gateway: row.gateway,
            created_at: row.created_at,
        })
    }
}

fn into_bookings(rows: Vec<BookingRow>) -> Result<Vec<Booking>, BoxError> {
    rows.into_iter()
        .map(|row| Booking::try_from(row).map_err(BoxError::from))
        .collect()
}

#[async_trait]
impl BookingRepository for PgBookingRepository {
    async fn record_booking(&self, booking: &NewBooking) -> Result<Booking, BoxError> {
        let guests = i32::try_from(booking.guests)
            .map_err(|_| StoreError::Corrupt(format!("{} guests", booking.guests)))?;
        let id = Uuid::new_v4().simple().to_string();

        // The unique payment reference makes a replayed write a no-op.
        let inserted = sqlx::query_as::<_, BookingRow>(&format!(
            r#"
            INSERT INTO bookings ({BOOKING_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            ON CONFLICT (payment_reference) DO NOTHING
            RETURNING {BOOKING_COLUMNS}
            "#
        ))
        .bind(&id)
        .bind(&booking.user_id)
        .bind(&booking.guest_name)
        .bind(booking.guest_email.expose())
        .bind(booking.guest_phone.expose())
        .bind(&booking.room_name)
        .bind(booking.check_in)
        .bind(booking.check_out)
        .bind(guests)
        .bind(booking.total_pesewas)
        .bind(booking.currency.code())
        .bind(booking.status.as_str())
        .bind(&booking.payment_reference)
        .bind(&booking.gateway)
        .bind(booking.created_at)
        .fetch_optional(&self.pool)
        .await?;

        match inserted {
            Some(row) => {
                tracing::info!("Booking {} stored for reference {}", row.id, row.payment_reference);
                Ok(Booking::try_from(row)?)
            }
            None => {
                tracing::info!("Booking for reference {} already stored", booking.payment_reference);
                self.find_by_reference(&booking.payment_reference)
                    .await?
                    .ok_or_else(|| "booking vanished after conflicting insert".into())
            }
        }
    }

    async fn find_by_reference(&self, reference: &str) -> Result<Option<Booking>, BoxError> {
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE payment_reference = $1"
        ))
        .bind(reference)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Booking::try_from).transpose()?)
    }

    async fn list_recent(&self) -> Result<Vec<Booking>, BoxError> {
        let rows = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        into_bookings(rows)
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Booking>, BoxError> {
        let rows = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        into_bookings(rows)
    }
}
