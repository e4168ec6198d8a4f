use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;
use wiz_catalog::parse_date;
use wiz_core::session::GUEST_REDIRECT;
use wiz_order::{GuestIdentity, PaymentOutcome};
use wiz_shared::format_cedis;

use crate::{error::AppError, middleware::Session, state::AppState};

#[derive(Debug, Deserialize)]
pub struct CreateReservationRequest {
    pub room_id: String,
    pub check_in: String,
    pub check_out: String,
    pub guests: u32,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutQuery {
    pub draft: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PaymentCallback {
    pub reference: String,
    pub outcome: PaymentOutcome,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/reservations", post(create_reservation))
        .route("/v1/checkout", get(checkout_view))
        .route("/v1/checkout/{draft_id}/payment", post(initiate_payment))
        .route("/v1/checkout/{draft_id}/callback", post(payment_callback))
}

async fn create_reservation(
    State(state): State<AppState>,
    Json(req): Json<CreateReservationRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let room = state
        .catalog
        .get(&req.room_id)
        .ok_or_else(|| AppError::NotFoundError(format!("Room not found: {}", req.room_id)))?;
    let check_in = parse_date(&req.check_in)?;
    let check_out = parse_date(&req.check_out)?;

    let draft = state.drafts.open(room, check_in, check_out, req.guests).await?;
    info!("Reservation draft {} for {} ({} nights)", draft.id, room.id, draft.nights);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "checkout_url": format!("/v1/checkout?draft={}", draft.id),
            "total_display": format_cedis(draft.total_pesewas),
            "draft": draft,
        })),
    ))
}

/// Checkout refuses to render without a live draft and sends the guest back
/// to the room listing instead.
async fn checkout_view(State(state): State<AppState>, Query(query): Query<CheckoutQuery>) -> Response {
    let draft_id = query.draft.as_deref().and_then(|raw| Uuid::parse_str(raw).ok());
    let draft = match draft_id {
        Some(id) => state.drafts.get(id).await,
        None => None,
    };

    let Some(draft) = draft else {
        return Redirect::to(GUEST_REDIRECT).into_response();
    };

    let session = state.checkout.session(draft.id).await;
    Json(json!({
        "gateway_ready": state.checkout.gateway_ready(),
        "total_display": format_cedis(draft.total_pesewas),
        "session": session,
        "draft": draft,
    }))
    .into_response()
}

async fn initiate_payment(
    State(state): State<AppState>,
    session: Session,
    Path(draft_id): Path<Uuid>,
    Json(identity): Json<GuestIdentity>,
) -> Result<Response, AppError> {
    match state.checkout.initiate(draft_id, &identity, session.user()).await {
        Ok(request) => Ok(Json(request).into_response()),
        Err(e) => {
            state.metrics.checkout_failed(e.kind());
            Err(e.into())
        }
    }
}

async fn payment_callback(
    State(state): State<AppState>,
    Path(draft_id): Path<Uuid>,
    Json(callback): Json<PaymentCallback>,
) -> Result<Response, AppError> {
    match state
        .checkout
        .complete(draft_id, &callback.reference, callback.outcome)
        .await
    {
        Ok(confirmation) => {
            state.metrics.booking_confirmed();
            Ok((StatusCode::CREATED, Json(confirmation)).into_response())
        }
        Err(e) => {
            state.metrics.checkout_failed(e.kind());
            // The guest may have been charged; answer with the reference to keep.
            match e.charged_reference().map(str::to_string) {
                Some(reference) => {
                    warn!("Payment {} accepted without a stored booking ({})", reference, e.kind());
                    Ok((
                        StatusCode::ACCEPTED,
                        Json(json!({ "reference": reference, "warning": e.to_string() })),
                    )
                        .into_response())
                }
                None => Err(e.into()),
            }
        }
    }
}
