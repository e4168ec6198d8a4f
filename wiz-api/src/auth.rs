use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tracing::info;
use wiz_core::{AuthError, AuthUser, IdentityProvider, ProfileRepository, Role, UserProfile};
use wiz_shared::Masked;

use crate::{
    error::AppError,
    middleware::SessionClaims,
    state::{AppState, AuthConfig},
};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub display_name: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct PasswordResetRequest {
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    /// Session token for this API
    pub token: String,
    /// Provider token, needed for profile updates
    pub id_token: String,
    pub user: AuthUser,
    pub role: Role,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/auth/register", post(register))
        .route("/v1/auth/login", post(login))
        .route("/v1/auth/password-reset", post(password_reset))
}

pub fn mint_token(auth: &AuthConfig, user: &AuthUser) -> Result<String, AppError> {
    let claims = SessionClaims {
        sub: user.uid.clone(),
        email: user.email.clone(),
        name: user.display_name.clone(),
        exp: (Utc::now() + Duration::seconds(auth.expiration as i64)).timestamp() as usize,
    };

    encode(&Header::default(), &claims, &EncodingKey::from_secret(auth.secret.as_bytes()))
        .map_err(|e| AppError::InternalServerError(format!("Token encoding failed: {}", e)))
}

fn fallback_name(user: &AuthUser) -> String {
    user.display_name
        .clone()
        .unwrap_or_else(|| user.email.split('@').next().unwrap_or_default().to_string())
}

/// Creates (or reuses) an account and gives it a privileged profile. Used by
/// the `create-operator` tool.
pub async fn provision_operator(
    identity: &dyn IdentityProvider,
    profiles: &dyn ProfileRepository,
    email: &str,
    password: &str,
    display_name: &str,
    role: Role,
) -> anyhow::Result<UserProfile> {
    let session = match identity.sign_up(email, password).await {
        Ok(session) => session,
        Err(AuthError::EmailInUse) => {
            info!("{} already registered, signing in", Masked::new(email));
            identity.sign_in(email, password).await?
        }
        Err(e) => return Err(e.into()),
    };

    let joined_at = profiles
        .get_profile(&session.user.uid)
        .await
        .map_err(|e| anyhow::anyhow!(e))?
        .map(|p| p.joined_at);

    let mut profile = UserProfile::new(&session.user, display_name, role);
    if let Some(joined_at) = joined_at {
        profile.joined_at = joined_at;
    }
    profiles.put_profile(&profile).await.map_err(|e| anyhow::anyhow!(e))?;
    Ok(profile)
}

async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let session = state.identity.sign_up(&req.email, &req.password).await?;
    let mut user = session.user;

    let display_name = req.display_name.trim();
    if !display_name.is_empty() {
        user = state.identity.update_profile(&session.id_token, display_name).await?;
    }

    let role = state.elevation.initial_role(&user.email);
    let name = if display_name.is_empty() { fallback_name(&user) } else { display_name.to_string() };
    state.profiles.put_profile(&UserProfile::new(&user, &name, role)).await?;

    info!("Registered {} as {}", Masked::new(&user.email), role.as_str());

    let token = mint_token(&state.auth, &user)?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse { token, id_token: session.id_token, user, role }),
    ))
}

async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let session = state.identity.sign_in(&req.email, &req.password).await?;
    let user = session.user;

    let role = match state.profiles.get_profile(&user.uid).await? {
        Some(profile) => profile.role,
        None => {
            // First sign-in for an account created elsewhere
            let role = state.elevation.initial_role(&user.email);
            state
                .profiles
                .put_profile(&UserProfile::new(&user, &fallback_name(&user), role))
                .await?;
            role
        }
    };

    let token = mint_token(&state.auth, &user)?;
    Ok(Json(AuthResponse { token, id_token: session.id_token, user, role }))
}

async fn password_reset(
    State(state): State<AppState>,
    Json(req): Json<PasswordResetRequest>,
) -> Result<StatusCode, AppError> {
    state.identity.send_password_reset(&req.email).await?;
    Ok(StatusCode::ACCEPTED)
}
