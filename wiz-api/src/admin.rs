use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    routing::{get, put},
    Json, Router,
};
use serde::Serialize;
use tracing::info;
use wiz_catalog::{InventoryEditor, InventoryStats, Room};
use wiz_core::{Booking, FlagKey, SessionState};

use crate::{
    error::AppError,
    middleware::{require_privileged, Session},
    state::AppState,
};

pub const MANUAL_BOOKING_RESTRICTED: &str = "Manual booking entry is restricted.";

#[derive(Debug, Serialize)]
struct Dashboard {
    session: SessionState,
    total_units: usize,
    available_units: usize,
    total_bookings: usize,
}

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/v1/admin", get(dashboard))
        .route("/v1/admin/dashboard", get(dashboard))
        .route("/v1/admin/rooms", get(list_units).post(create_unit))
        .route("/v1/admin/rooms/{id}", put(update_unit))
        .route("/v1/admin/bookings", get(list_bookings).post(manual_booking))
        .route("/v1/admin/session/override", put(set_override))
        .route_layer(middleware::from_fn_with_state(state, require_privileged))
}

/// Units as this browser sees them: its locally edited copy when one exists.
async fn current_units(state: &AppState, session: &Session) -> Result<Vec<Room>, AppError> {
    match session.0.client.as_ref() {
        Some(client) => Ok(InventoryEditor::new(&state.catalog, state.flags.as_ref())
            .load(client)
            .await?),
        None => Ok(state.catalog.rooms().to_vec()),
    }
}

async fn dashboard(State(state): State<AppState>, session: Session) -> Result<Json<Dashboard>, AppError> {
    let units = current_units(&state, &session).await?;
    let stats = InventoryStats::of(&units);
    let bookings = state.bookings.list_recent().await?;

    Ok(Json(Dashboard {
        session: session.0.state,
        total_units: stats.total_units,
        available_units: stats.available_units,
        total_bookings: bookings.len(),
    }))
}

async fn list_units(State(state): State<AppState>, session: Session) -> Result<Json<Vec<Room>>, AppError> {
    Ok(Json(current_units(&state, &session).await?))
}

async fn create_unit(
    State(state): State<AppState>,
    session: Session,
) -> Result<(StatusCode, Json<Room>), AppError> {
    let client = session.require_client()?;
    let room = InventoryEditor::new(&state.catalog, state.flags.as_ref())
        .create_unit(client)
        .await?;
    Ok((StatusCode::CREATED, Json(room)))
}

async fn update_unit(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Json(room): Json<Room>,
) -> Result<Json<Room>, AppError> {
    if room.id != id {
        return Err(AppError::ValidationError("Room id does not match the path".to_string()));
    }
    let client = session.require_client()?;
    let room = InventoryEditor::new(&state.catalog, state.flags.as_ref())
        .update_unit(client, room)
        .await?;
    Ok(Json(room))
}

async fn list_bookings(State(state): State<AppState>) -> Result<Json<Vec<Booking>>, AppError> {
    Ok(Json(state.bookings.list_recent().await?))
}

async fn manual_booking() -> AppError {
    AppError::AuthorizationError(MANUAL_BOOKING_RESTRICTED.to_string())
}

/// Marks this browser as a privileged session. It stays privileged, signed in
/// or not, until the flag is cleared.
async fn set_override(State(state): State<AppState>, session: Session) -> Result<StatusCode, AppError> {
    let client = session.require_client()?;
    state.flags.set_flag(client, FlagKey::AdminSession, "true").await?;
    info!("Admin session override set for {}", client);
    Ok(StatusCode::NO_CONTENT)
}
