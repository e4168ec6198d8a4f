use axum::{extract::State, http::header, response::IntoResponse, routing::get, Router};
use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

use crate::{error::AppError, state::AppState};

pub struct Metrics {
    registry: Registry,
    bookings_confirmed: IntCounter,
    checkout_failures: IntCounterVec,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let bookings_confirmed = IntCounter::new(
            "wiz_bookings_confirmed_total",
            "Bookings written after a verified payment",
        )?;
        let checkout_failures = IntCounterVec::new(
            Opts::new("wiz_checkout_failures_total", "Checkout attempts that did not end in a booking"),
            &["kind"],
        )?;

        registry.register(Box::new(bookings_confirmed.clone()))?;
        registry.register(Box::new(checkout_failures.clone()))?;

        Ok(Self { registry, bookings_confirmed, checkout_failures })
    }

    pub fn booking_confirmed(&self) {
        self.bookings_confirmed.inc();
    }

    pub fn checkout_failed(&self, kind: &str) {
        self.checkout_failures.with_label_values(&[kind]).inc();
    }

    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/metrics", get(scrape))
}

async fn scrape(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let body = state
        .metrics
        .render()
        .map_err(|e| AppError::InternalServerError(format!("Metrics encoding failed: {}", e)))?;
    Ok(([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body))
}
