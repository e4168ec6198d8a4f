use axum::{
    extract::{FromRequestParts, Request},
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use axum_extra::headers::{authorization::Bearer, Authorization, Header};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;
use wiz_core::{AuthUser, ClientId, RouteAccess, SessionContext, SessionProvider};

use crate::{error::AppError, state::AppState};

/// Header carrying the browser id that local flags are scoped to.
pub const CLIENT_HEADER: &str = "x-wiz-client";

// ============================================================================
// Session token
// ============================================================================

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionClaims {
    pub sub: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub exp: usize,
}

impl From<SessionClaims> for AuthUser {
    fn from(claims: SessionClaims) -> Self {
        AuthUser { uid: claims.sub, email: claims.email, display_name: claims.name }
    }
}

fn bearer_user(parts: &Parts, secret: &str) -> Result<Option<AuthUser>, AppError> {
    let mut values = parts.headers.get_all(AUTHORIZATION).iter().peekable();
    if values.peek().is_none() {
        return Ok(None);
    }

    let Authorization(bearer) = Authorization::<Bearer>::decode(&mut values)
        .map_err(|_| AppError::AuthenticationError("Malformed Authorization header".to_string()))?;

    let token_data = decode::<SessionClaims>(
        bearer.token(),
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| AppError::AuthenticationError(format!("Invalid session token: {}", e)))?;

    Ok(Some(token_data.claims.into()))
}

fn client_id(parts: &Parts) -> Result<Option<ClientId>, AppError> {
    match parts.headers.get(CLIENT_HEADER) {
        None => Ok(None),
        Some(value) => {
            let raw = value
                .to_str()
                .map_err(|_| AppError::ValidationError("Invalid client id".to_string()))?;
            Ok(Some(ClientId::parse(raw)?))
        }
    }
}

// ============================================================================
// Extractor
// ============================================================================

/// The visitor behind a request: browser flags plus the signed-in user, with
/// the role already resolved.
#[derive(Debug, Clone)]
pub struct Session(pub SessionContext);

impl Session {
    pub fn user(&self) -> Option<&AuthUser> {
        self.0.session().user()
    }

    pub fn require_user(&self) -> Result<&AuthUser, AppError> {
        self.user()
            .ok_or_else(|| AppError::AuthenticationError("Sign in to continue".to_string()))
    }

    pub fn require_client(&self) -> Result<&ClientId, AppError> {
        self.0
            .client()
            .ok_or_else(|| AppError::ValidationError("X-Wiz-Client header is required".to_string()))
    }
}

impl FromRequestParts<AppState> for Session {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(session) = parts.extensions.get::<Session>() {
            return Ok(session.clone());
        }

        let user = bearer_user(parts, &state.auth.secret)?;
        let client = client_id(parts)?;
        let context = SessionContext::load(client, user, state.flags.as_ref(), state.profiles.as_ref()).await;

        let session = Session(context);
        parts.extensions.insert(session.clone());
        Ok(session)
    }
}

// ============================================================================
// Admin console guard
// ============================================================================

pub async fn require_privileged(session: Session, mut req: Request, next: Next) -> Response {
    match session.0.access() {
        RouteAccess::Allow => {
            req.extensions_mut().insert(session);
            next.run(req).await
        }
        RouteAccess::Redirect(location) => {
            tracing::debug!("Non-privileged visitor sent to {}", location);
            Redirect::to(location).into_response()
        }
        RouteAccess::Pending => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "resolving" })),
        )
            .into_response(),
    }
}
