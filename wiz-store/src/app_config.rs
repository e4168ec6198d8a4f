use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub auth: AuthConfig,
    pub identity: IdentityConfig,
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub checkout: CheckoutConfig,
    #[serde(default)]
    pub reconciliation: ReconciliationConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RedisConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expiration_seconds: u64,
    /// Emails granted the operator role on registration or first sign-in
    #[serde(default)]
    pub operator_emails: Vec<String>,
    /// Any email containing this is granted the operator role. Unset by default.
    #[serde(default)]
    pub operator_email_substring: Option<String>,
}

/// Hosted authentication service (identity toolkit REST API)
#[derive(Debug, Deserialize, Clone)]
pub struct IdentityConfig {
    pub api_key: String,
    #[serde(default = "default_identity_url")]
    pub base_url: String,
}

fn default_identity_url() -> String {
    "https://identitytoolkit.googleapis.com/v1".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct GatewayConfig {
    pub public_key: String,
    pub secret_key: String,
    #[serde(default = "default_gateway_url")]
    pub base_url: String,
    #[serde(default = "default_script_url")]
    pub script_url: String,
    #[serde(default = "default_poll_ms")]
    pub readiness_poll_ms: u64,
}

fn default_gateway_url() -> String {
    "https://api.paystack.co".to_string()
}

fn default_script_url() -> String {
    "https://js.paystack.co/v1/inline.js".to_string()
}

fn default_poll_ms() -> u64 {
    500
}

#[derive(Debug, Deserialize, Clone)]
pub struct CheckoutConfig {
    pub draft_ttl_seconds: u64,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self { draft_ttl_seconds: 1800 }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReconciliationConfig {
    pub sweep_interval_seconds: u64,
}

impl Default for ReconciliationConfig {
    fn default() -> Self {
        Self { sweep_interval_seconds: 60 }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Per-environment overrides are optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, never checked in
            .add_source(config::File::with_name("config/local").required(false))
            // e.g. `WIZ__GATEWAY__SECRET_KEY=sk_live_...`
            .add_source(
                config::Environment::with_prefix("WIZ")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("auth.operator_emails")
                    .try_parsing(true),
            )
            .build()?;

        s.try_deserialize()
    }
}
