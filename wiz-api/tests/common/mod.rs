#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;
use wiz_api::{
    app,
    metrics::Metrics,
    state::{AppState, AuthConfig},
};
use wiz_catalog::Catalog;
use wiz_core::identity::MockIdentityProvider;
use wiz_core::OperatorElevation;
use wiz_order::{CheckoutOrchestrator, DraftStore, GatewayReadiness, MockPaymentGateway, ReconciliationQueue};
use wiz_store::memory::{MemoryBookingRepository, MemoryFlagStore, MemoryProfileRepository};

pub const CLIENT: &str = "browser-test-1";

pub struct Harness {
    pub app: Router,
    pub state: AppState,
    pub gateway: Arc<MockPaymentGateway>,
    pub bookings: Arc<MemoryBookingRepository>,
    pub flags: Arc<MemoryFlagStore>,
    pub profiles: Arc<MemoryProfileRepository>,
    pub identity: Arc<MockIdentityProvider>,
    pub reconciliation: Arc<ReconciliationQueue>,
}

pub fn harness() -> Harness {
    harness_with_gateway(true)
}

pub fn harness_with_gateway(ready: bool) -> Harness {
    let gateway = Arc::new(MockPaymentGateway::new(ready));
    let bookings = Arc::new(MemoryBookingRepository::new());
    let flags = Arc::new(MemoryFlagStore::new());
    let profiles = Arc::new(MemoryProfileRepository::new());
    let identity = Arc::new(MockIdentityProvider::new());
    let drafts = Arc::new(DraftStore::new(1800));
    let reconciliation = Arc::new(ReconciliationQueue::new());

    let checkout = Arc::new(CheckoutOrchestrator::new(
        "pk_test_wiz".to_string(),
        gateway.clone(),
        GatewayReadiness::fixed(ready),
        bookings.clone(),
        drafts.clone(),
        reconciliation.clone(),
    ));

    let state = AppState {
        catalog: Arc::new(Catalog::builtin()),
        bookings: bookings.clone(),
        profiles: profiles.clone(),
        flags: flags.clone(),
        identity: identity.clone(),
        drafts,
        checkout,
        elevation: OperatorElevation::new(vec!["wizhomes1@gmail.com".to_string()], None),
        metrics: Arc::new(Metrics::new().unwrap()),
        auth: AuthConfig { secret: "test-secret".to_string(), expiration: 3600 },
    };

    Harness {
        app: app(state.clone()),
        state,
        gateway,
        bookings,
        flags,
        profiles,
        identity,
        reconciliation,
    }
}

pub struct Reply {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
    pub text: String,
}

pub struct Call {
    method: Method,
    uri: String,
    headers: Vec<(String, String)>,
    body: Option<Value>,
}

pub fn call(method: Method, uri: &str) -> Call {
    Call { method, uri: uri.to_string(), headers: Vec::new(), body: None }
}

impl Call {
    pub fn client(mut self, client: &str) -> Self {
        self.headers.push(("x-wiz-client".to_string(), client.to_string()));
        self
    }

    pub fn bearer(mut self, token: &str) -> Self {
        self.headers.push(("authorization".to_string(), format!("Bearer {}", token)));
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub async fn send(self, app: &Router) -> Reply {
        let mut builder = Request::builder().method(self.method).uri(self.uri);
        for (name, value) in &self.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let request = match self.body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8_lossy(&bytes).to_string();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        Reply { status, headers, body, text }
    }
}

impl Reply {
    pub fn location(&self) -> Option<&str> {
        self.headers.get(header::LOCATION).and_then(|v| v.to_str().ok())
    }
}
