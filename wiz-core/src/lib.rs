pub mod booking;
pub mod repository;
pub mod identity;
pub mod payment;
pub mod flags;
pub mod session;

pub use booking::{Booking, BookingStatus, NewBooking};
pub use flags::{ClientId, FlagKey, FlagStore, Theme};
pub use identity::{AuthError, AuthSession, AuthUser, IdentityProvider, Role, UserProfile};
pub use payment::{PaymentGateway, PaymentRequest, TransactionStatus, VerifiedTransaction};
pub use repository::{BookingRepository, ProfileRepository};
pub use session::{OperatorElevation, RouteAccess, SessionContext, SessionProvider, SessionResolver, SessionState};

/// Error type used at the trait seams to the hosted services.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Internal service error: {0}")]
    InternalError(String),
    #[error("Identity verification failed: {0}")]
    IdentityError(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
