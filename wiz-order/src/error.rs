/// Everything that can stop a guest between the room page and the
/// confirmation view. The display strings are shown to the guest as-is.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum CheckoutError {
    #[error("{0}")]
    Validation(String),

    #[error("Reservation not found or expired")]
    DraftNotFound,

    #[error("Gateway Error: The security module is still initializing. Please wait.")]
    GatewayNotReady,

    #[error("A payment is already in progress for this reservation")]
    PaymentInProgress,

    #[error("No payment is open for this reservation")]
    NoOpenPayment,

    #[error("Session Interrupted: Payment window closed before authorization.")]
    PaymentWindowClosed,

    #[error("Payment was not accepted: {0}")]
    GatewayRejected(String),

    #[error("Gateway Error: {0}")]
    Gateway(String),

    #[error("Payment confirmed, but reservation storage failed. Please save this reference: {reference}")]
    StorageAfterPayment { reference: String },

    #[error("Payment received, but the gateway has not confirmed it yet. Please save this reference: {reference}")]
    PaymentUnconfirmed { reference: String },

    #[error("Payment received, but the amount does not match the reservation total. Please save this reference: {reference}")]
    AmountMismatch { reference: String },
}

pub const INCOMPLETE_IDENTITY: &str = "Incomplete Identity: Please provide your name, email, and phone number.";

impl CheckoutError {
    pub fn incomplete_identity() -> Self {
        CheckoutError::Validation(INCOMPLETE_IDENTITY.to_string())
    }

    /// Short label used for failure counters and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            CheckoutError::Validation(_) => "validation",
            CheckoutError::DraftNotFound => "draft_not_found",
            CheckoutError::GatewayNotReady => "gateway_not_ready",
            CheckoutError::PaymentInProgress => "payment_in_progress",
            CheckoutError::NoOpenPayment => "no_open_payment",
            CheckoutError::PaymentWindowClosed => "window_closed",
            CheckoutError::GatewayRejected(_) => "gateway_rejected",
            CheckoutError::Gateway(_) => "gateway",
            CheckoutError::StorageAfterPayment { .. } => "storage_after_payment",
            CheckoutError::PaymentUnconfirmed { .. } => "payment_unconfirmed",
            CheckoutError::AmountMismatch { .. } => "amount_mismatch",
        }
    }

    /// The gateway reference for failures where the guest may already have
    /// been charged. The guest must keep it.
    pub fn charged_reference(&self) -> Option<&str> {
        match self {
            CheckoutError::StorageAfterPayment { reference }
            | CheckoutError::PaymentUnconfirmed { reference }
            | CheckoutError::AmountMismatch { reference } => Some(reference),
            _ => None,
        }
    }
}
