use std::sync::Arc;
use wiz_catalog::Catalog;
use wiz_core::{BookingRepository, FlagStore, IdentityProvider, OperatorElevation, ProfileRepository};
use wiz_order::{CheckoutOrchestrator, DraftStore};

use crate::metrics::Metrics;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub bookings: Arc<dyn BookingRepository>,
    pub profiles: Arc<dyn ProfileRepository>,
    pub flags: Arc<dyn FlagStore>,
    pub identity: Arc<dyn IdentityProvider>,
    pub drafts: Arc<DraftStore>,
    pub checkout: Arc<CheckoutOrchestrator>,
    pub elevation: OperatorElevation,
    pub metrics: Arc<Metrics>,
    pub auth: AuthConfig,
}
