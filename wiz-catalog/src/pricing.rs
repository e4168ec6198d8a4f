use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use wiz_shared::Currency;

use crate::room::Rate;

/// Nights shown for a monthly unit, whatever dates were picked.
pub const MONTHLY_BILLED_NIGHTS: u32 = 30;

/// Dates the room detail view starts from.
pub const DEFAULT_CHECK_IN: &str = "2026-12-01";
pub const DEFAULT_CHECK_OUT: &str = "2026-12-05";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PricingError {
    #[error("Invalid date {0:?}, expected YYYY-MM-DD")]
    InvalidDate(String),
}

/// Price of a stay as shown on the room detail view.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Quote {
    pub nights: u32,
    pub billed_nights: u32,
    pub total_pesewas: i64,
    pub currency: Currency,
}

/// Nights between two calendar dates. Same-day and inverted ranges count as
/// one night rather than failing.
pub fn nights(check_in: NaiveDate, check_out: NaiveDate) -> u32 {
    let days = (check_out - check_in).num_days();
    if days > 0 {
        u32::try_from(days).unwrap_or(u32::MAX)
    } else {
        1
    }
}

pub fn quote(rate: &Rate, check_in: NaiveDate, check_out: NaiveDate) -> Quote {
    let nights = nights(check_in, check_out);
    Quote {
        nights,
        billed_nights: rate.billed_nights(nights),
        total_pesewas: rate.total(nights),
        currency: Currency::Ghs,
    }
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, PricingError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| PricingError::InvalidDate(raw.to_string()))
}

pub fn default_stay() -> Result<(NaiveDate, NaiveDate), PricingError> {
    Ok((parse_date(DEFAULT_CHECK_IN)?, parse_date(DEFAULT_CHECK_OUT)?))
}
