use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use wiz_catalog::{default_stay, parse_date, quote, Quote, Room};
use wiz_shared::format_cedis;

use crate::{error::AppError, state::AppState};

#[derive(Debug, Serialize)]
struct QuoteView {
    check_in: NaiveDate,
    check_out: NaiveDate,
    guests: u32,
    #[serde(flatten)]
    quote: Quote,
    total_display: String,
}

impl QuoteView {
    fn new(room: &Room, check_in: NaiveDate, check_out: NaiveDate, guests: u32) -> Self {
        let quote = quote(&room.rate, check_in, check_out);
        Self { check_in, check_out, guests, total_display: format_cedis(quote.total_pesewas), quote }
    }
}

#[derive(Debug, Serialize)]
struct RoomDetail<'a> {
    room: &'a Room,
    images: Vec<&'a str>,
    price_display: String,
    default_stay: QuoteView,
}

#[derive(Debug, Deserialize)]
struct QuoteParams {
    check_in: String,
    check_out: String,
    #[serde(default = "one_guest")]
    guests: u32,
}

fn one_guest() -> u32 {
    1
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/rooms", get(list_rooms))
        .route("/v1/rooms/{id}", get(get_room))
        .route("/v1/rooms/{id}/quote", get(quote_room))
}

fn find_room<'a>(state: &'a AppState, id: &str) -> Result<&'a Room, AppError> {
    state
        .catalog
        .get(id)
        .ok_or_else(|| AppError::NotFoundError(format!("Room not found: {}", id)))
}

async fn list_rooms(State(state): State<AppState>) -> Json<Vec<Room>> {
    Json(state.catalog.rooms().to_vec())
}

async fn get_room(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let room = find_room(&state, &id)?;
    let (check_in, check_out) = default_stay()?;

    let detail = RoomDetail {
        room,
        images: room.images(),
        price_display: format!("{} / {}", format_cedis(room.rate.price()), room.rate.frequency()),
        default_stay: QuoteView::new(room, check_in, check_out, 1),
    };
    let body = serde_json::to_value(&detail)
        .map_err(|e| AppError::InternalServerError(format!("Room serialization failed: {}", e)))?;
    Ok(Json(body))
}

async fn quote_room(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<QuoteParams>,
) -> Result<Json<QuoteView>, AppError> {
    let room = find_room(&state, &id)?;
    if params.guests < 1 {
        return Err(AppError::ValidationError("At least one guest is required.".to_string()));
    }
    let check_in = parse_date(&params.check_in)?;
    let check_out = parse_date(&params.check_out)?;

    Ok(Json(QuoteView::new(room, check_in, check_out, params.guests)))
}
