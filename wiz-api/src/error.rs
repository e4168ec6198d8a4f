use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use wiz_catalog::{CatalogError, PricingError};
use wiz_core::{AuthError, BoxError, CoreError};
use wiz_order::CheckoutError;

#[derive(Debug)]
pub enum AppError {
    AuthenticationError(String),
    AuthorizationError(String),
    ValidationError(String),
    NotFoundError(String),
    ConflictError(String),
    PaymentError(String),
    BadGateway(String),
    ServiceUnavailable(String),
    InternalServerError(String),
    Anyhow(anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::AuthenticationError(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::AuthorizationError(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::ConflictError(msg) => (StatusCode::CONFLICT, msg),
            AppError::PaymentError(msg) => (StatusCode::PAYMENT_REQUIRED, msg),
            AppError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
            AppError::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            }
            AppError::Anyhow(err) => {
                tracing::error!("Internal Server Error: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Anyhow(err)
    }
}

impl From<BoxError> for AppError {
    fn from(err: BoxError) -> Self {
        Self::Anyhow(anyhow::anyhow!(err))
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ValidationError(msg) => AppError::ValidationError(msg),
            CoreError::NotFound(msg) => AppError::NotFoundError(msg),
            CoreError::IdentityError(msg) => AppError::AuthenticationError(msg),
            CoreError::InternalError(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        let message = err.to_string();
        match err {
            AuthError::InvalidCredential => AppError::AuthenticationError(message),
            AuthError::EmailInUse => AppError::ConflictError(message),
            AuthError::WeakPassword | AuthError::InvalidEmail => AppError::ValidationError(message),
            AuthError::PermissionDenied => AppError::AuthorizationError(message),
            AuthError::Unavailable(detail) => {
                tracing::warn!("Identity service unavailable: {}", detail);
                AppError::ServiceUnavailable(message)
            }
        }
    }
}

impl From<PricingError> for AppError {
    fn from(err: PricingError) -> Self {
        AppError::ValidationError(err.to_string())
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound(id) => AppError::NotFoundError(format!("Room not found: {}", id)),
            CatalogError::Invalid(msg) => AppError::ValidationError(msg),
            CatalogError::Storage(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl From<CheckoutError> for AppError {
    fn from(err: CheckoutError) -> Self {
        let message = err.to_string();
        match err {
            CheckoutError::Validation(_) => AppError::ValidationError(message),
            CheckoutError::DraftNotFound => AppError::NotFoundError(message),
            CheckoutError::GatewayNotReady => AppError::ServiceUnavailable(message),
            CheckoutError::PaymentInProgress | CheckoutError::NoOpenPayment => AppError::ConflictError(message),
            CheckoutError::PaymentWindowClosed | CheckoutError::GatewayRejected(_) => {
                AppError::PaymentError(message)
            }
            CheckoutError::Gateway(_) => AppError::BadGateway(message),
            // Handlers answer these with 202; reaching here is a bug.
            CheckoutError::StorageAfterPayment { .. }
            | CheckoutError::PaymentUnconfirmed { .. }
            | CheckoutError::AmountMismatch { .. } => AppError::InternalServerError(message),
        }
    }
}
