use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use wiz_shared::{Currency, Masked};

/// User id written on bookings made without a signed-in account.
pub const ANONYMOUS_USER: &str = "guest";

/// Label stored with every booking to identify the capturing gateway.
pub const GATEWAY_LABEL: &str = "Paystack-Live-V1";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BookingStatus {
    Confirmed,
    Pending,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Confirmed => "Confirmed",
            BookingStatus::Pending => "Pending",
            BookingStatus::Cancelled => "Cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Confirmed" => Some(BookingStatus::Confirmed),
            "Pending" => Some(BookingStatus::Pending),
            "Cancelled" => Some(BookingStatus::Cancelled),
            _ => None,
        }
    }
}

/// A booking as it is handed to the document store. The store assigns the id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBooking {
    pub user_id: String,
    pub guest_name: String,
    pub guest_email: Masked<String>,
    pub guest_phone: Masked<String>,
    pub room_name: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: u32,
    pub total_pesewas: i64,
    pub currency: Currency,
    pub status: BookingStatus,
    pub payment_reference: String,
    pub gateway: String,
    pub created_at: DateTime<Utc>,
}

impl NewBooking {
    pub fn with_id(self, id: String) -> Booking {
        Booking {
            id,
            user_id: self.user_id,
            guest_name: self.guest_name,
            guest_email: self.guest_email,
            guest_phone: self.guest_phone,
            room_name: self.room_name,
            check_in: self.check_in,
            check_out: self.check_out,
            guests: self.guests,
            total_pesewas: self.total_pesewas,
            currency: self.currency,
            status: self.status,
            payment_reference: self.payment_reference,
            gateway: self.gateway,
            created_at: self.created_at,
        }
    }
}

/// A confirmed reservation record. Never updated once written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub user_id: String,
    pub guest_name: String,
    pub guest_email: Masked<String>,
    pub guest_phone: Masked<String>,
    pub room_name: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: u32,
    pub total_pesewas: i64,
    pub currency: Currency,
    pub status: BookingStatus,
    pub payment_reference: String,
    pub gateway: String,
    pub created_at: DateTime<Utc>,
}
