use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use wiz_core::{Booking, Role, UserProfile};

use crate::{error::AppError, middleware::Session, state::AppState};

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub display_name: String,
    /// Provider token returned at sign-in
    pub id_token: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/profile", get(get_profile).put(update_profile))
        .route("/v1/profile/bookings", get(my_bookings))
}

async fn get_profile(State(state): State<AppState>, session: Session) -> Result<Json<UserProfile>, AppError> {
    let user = session.require_user()?;
    let profile = state
        .profiles
        .get_profile(&user.uid)
        .await?
        .ok_or_else(|| AppError::NotFoundError("Profile not found".to_string()))?;
    Ok(Json(profile))
}

async fn update_profile(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<UserProfile>, AppError> {
    let user = session.require_user()?;
    let display_name = req.display_name.trim();
    if display_name.is_empty() {
        return Err(AppError::ValidationError("Display name must not be empty".to_string()));
    }

    let updated = state.identity.update_profile(&req.id_token, display_name).await?;
    if updated.uid != user.uid {
        return Err(AppError::AuthorizationError("Token belongs to another account".to_string()));
    }

    let profile = match state.profiles.get_profile(&user.uid).await? {
        Some(mut profile) => {
            profile.display_name = display_name.to_string();
            profile
        }
        None => UserProfile::new(user, display_name, Role::Guest),
    };
    state.profiles.put_profile(&profile).await?;
    Ok(Json(profile))
}

async fn my_bookings(State(state): State<AppState>, session: Session) -> Result<Json<Vec<Booking>>, AppError> {
    let user = session.require_user()?;
    Ok(Json(state.bookings.list_for_user(&user.uid).await?))
}
