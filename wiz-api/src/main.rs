use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wiz_api::{
    app,
    metrics::Metrics,
    state::{AppState, AuthConfig},
};
use wiz_catalog::Catalog;
use wiz_core::{BookingRepository, OperatorElevation, PaymentGateway};
use wiz_order::{
    run_draft_sweeper, CheckoutOrchestrator, DraftStore, GatewayReadiness, ReconciliationQueue,
    ReconciliationWorker,
};
use wiz_store::app_config::Config;
use wiz_store::{DbClient, IdentityToolkitClient, PaystackGateway, PgBookingRepository, PgProfileRepository, RedisClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wiz_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting WIZ Homes API on port {}", config.server.port);

    // Postgres
    let db = DbClient::new(&config.database.url)
        .await
        .context("Failed to connect to Postgres")?;
    db.migrate().await.context("Failed to run migrations")?;

    // Redis
    let redis = RedisClient::new(&config.redis.url)
        .await
        .context("Failed to connect to Redis")?;

    // Hosted services
    let gateway: Arc<dyn PaymentGateway> = Arc::new(PaystackGateway::new(
        &config.gateway.base_url,
        &config.gateway.script_url,
        &config.gateway.secret_key,
    )?);
    let identity = Arc::new(IdentityToolkitClient::new(&config.identity.base_url, &config.identity.api_key)?);

    let bookings: Arc<dyn BookingRepository> = Arc::new(PgBookingRepository::new(db.pool.clone()));
    let profiles = Arc::new(PgProfileRepository::new(db.pool.clone()));

    let readiness = GatewayReadiness::spawn(
        gateway.clone(),
        Duration::from_millis(config.gateway.readiness_poll_ms),
    );
    let drafts = Arc::new(DraftStore::new(config.checkout.draft_ttl_seconds));
    let reconciliation = Arc::new(ReconciliationQueue::new());

    let checkout = Arc::new(CheckoutOrchestrator::new(
        config.gateway.public_key.clone(),
        gateway.clone(),
        readiness,
        bookings.clone(),
        drafts.clone(),
        reconciliation.clone(),
    ));

    // Background workers
    tokio::spawn(run_draft_sweeper(drafts.clone(), checkout.clone(), Duration::from_secs(60)));
    let worker = ReconciliationWorker::new(reconciliation, gateway, bookings.clone());
    tokio::spawn(worker.run(Duration::from_secs(config.reconciliation.sweep_interval_seconds)));

    let app_state = AppState {
        catalog: Arc::new(Catalog::builtin()),
        bookings,
        profiles,
        flags: Arc::new(redis),
        identity,
        drafts,
        checkout,
        elevation: OperatorElevation::new(
            config.auth.operator_emails.clone(),
            config.auth.operator_email_substring.clone(),
        ),
        metrics: Arc::new(Metrics::new()?),
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
            expiration: config.auth.jwt_expiration_seconds,
        },
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
