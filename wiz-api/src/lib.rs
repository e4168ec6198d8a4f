use axum::{
    http::{header, HeaderName, Method},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod admin;
pub mod auth;
pub mod checkout;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod profile;
pub mod rooms;
pub mod session;
pub mod state;

pub use state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::USER_AGENT,
            HeaderName::from_static(middleware::CLIENT_HEADER),
        ]);

    Router::new()
        .merge(rooms::routes())
        .merge(checkout::routes())
        .merge(auth::routes())
        .merge(profile::routes())
        .merge(session::routes())
        .merge(admin::routes(state.clone()))
        .merge(metrics::routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
