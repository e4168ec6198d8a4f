pub mod error;
pub mod draft;
pub mod checkout;
pub mod readiness;
pub mod reconciliation;

pub use checkout::{
    payment_reference, CheckoutOrchestrator, CheckoutSession, Confirmation, GuestIdentity, MockPaymentGateway,
    PaymentOutcome,
};
pub use draft::{run_draft_sweeper, DraftStore, ReservationDraft};
pub use error::CheckoutError;
pub use readiness::GatewayReadiness;
pub use reconciliation::{PendingBooking, ReconciliationQueue, ReconciliationWorker, SweepReport};
