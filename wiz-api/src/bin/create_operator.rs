//! Provision an operator (or admin) account for the WIZ Homes console.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use wiz_api::auth::provision_operator;
use wiz_core::Role;
use wiz_store::app_config::Config;
use wiz_store::{DbClient, IdentityToolkitClient, PgProfileRepository};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum RoleArg {
    Operator,
    Admin,
}

impl From<RoleArg> for Role {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Operator => Role::Operator,
            RoleArg::Admin => Role::Admin,
        }
    }
}

/// `create-operator` command arguments.
#[derive(Debug, Parser)]
#[command(
    name = "create-operator",
    about = "Create or promote an account with access to the admin console",
    version
)]
struct CliArgs {
    #[arg(long, value_name = "email")]
    email: String,
    /// Password for a new account, or the existing account's password.
    #[arg(long, value_name = "password", env = "WIZ_OPERATOR_PASSWORD")]
    password: String,
    #[arg(long = "display-name", value_name = "name", default_value = "Operator")]
    display_name: String,
    #[arg(long, value_enum, default_value_t = RoleArg::Operator)]
    role: RoleArg,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = CliArgs::parse();
    let config = Config::load().context("Failed to load config")?;

    let db = DbClient::new(&config.database.url)
        .await
        .context("Failed to connect to Postgres")?;
    db.migrate().await.context("Failed to run migrations")?;

    let identity = IdentityToolkitClient::new(&config.identity.base_url, &config.identity.api_key)?;
    let profiles = PgProfileRepository::new(db.pool.clone());

    let profile = provision_operator(
        &identity,
        &profiles,
        &args.email,
        &args.password,
        &args.display_name,
        args.role.into(),
    )
    .await?;

    println!("{} is now {} (uid {})", profile.email, profile.role.as_str(), profile.uid);
    Ok(())
}
