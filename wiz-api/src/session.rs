use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::{delete, get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use wiz_core::{FlagKey, SessionProvider, SessionState, Theme};

use crate::{error::AppError, middleware::Session, state::AppState};

#[derive(Debug, Serialize)]
struct SessionView {
    client: Option<String>,
    session: SessionState,
    theme: Theme,
}

#[derive(Debug, Default, Deserialize)]
struct ThemeRequest {
    /// Omit to toggle
    theme: Option<Theme>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/session", get(current_session))
        .route("/v1/session/theme", put(set_theme))
        .route("/v1/session/override", delete(clear_override))
}

async fn current_session(session: Session) -> Json<SessionView> {
    let context = session.0;
    Json(SessionView {
        client: context.client().map(|c| c.to_string()),
        theme: context.theme(),
        session: context.state,
    })
}

async fn set_theme(
    State(state): State<AppState>,
    session: Session,
    body: Bytes,
) -> Result<Json<serde_json::Value>, AppError> {
    let client = session.require_client()?;
    let request: ThemeRequest = if body.is_empty() {
        ThemeRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| AppError::ValidationError(format!("Invalid theme request: {}", e)))?
    };
    let theme = request.theme.unwrap_or_else(|| session.0.theme().toggled());

    state.flags.set_flag(client, FlagKey::Theme, theme.as_str()).await?;
    Ok(Json(serde_json::json!({ "theme": theme })))
}

async fn clear_override(State(state): State<AppState>, session: Session) -> Result<StatusCode, AppError> {
    let client = session.require_client()?;
    state.flags.clear_flag(client, FlagKey::AdminSession).await?;
    info!("Admin session override cleared for {}", client);
    Ok(StatusCode::NO_CONTENT)
}
