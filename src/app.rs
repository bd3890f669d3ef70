use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use crate::api::{ApiClient, FileStorage, LocalStorage};
use crate::auth::{DisabledIdentityProvider, FirebaseIdentityProvider, IdentityProvider, SessionContext};
use crate::checkout::StripeProvider;
use crate::cli::{self, Cli};
use crate::config::AppConfig;

/// Everything a command needs: configuration plus the session, which owns
/// the API client.
pub struct AppContext {
    pub config: AppConfig,
    pub session: SessionContext,
}

impl AppContext {
    pub fn build(config: AppConfig) -> anyhow::Result<Self> {
        let storage: Arc<dyn LocalStorage> = Arc::new(FileStorage::new(&config.storage.path));
        let api = ApiClient::from_config(&config.api, storage).context("failed to build api client")?;

        let identity: Arc<dyn IdentityProvider> = match FirebaseIdentityProvider::from_config(&config.identity) {
            Ok(p) => Arc::new(p),
            Err(e) => {
                tracing::debug!(error = %e, "identity provider disabled");
                Arc::new(DisabledIdentityProvider)
            }
        };

        let session = SessionContext::restore(api, identity).context("failed to restore session")?;
        Ok(Self { config, session })
    }

    pub fn payments(&self) -> anyhow::Result<StripeProvider> {
        StripeProvider::from_config(&self.config.payment).context("card payments are unavailable")
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    // logging to stderr so command output stays clean
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .try_init();

    let config = AppConfig::load()?;
    tracing::debug!(api = %config.api.base_url, storage = %config.storage.path, "loaded config");

    let mut ctx = AppContext::build(config)?;
    cli::execute(cli.command, &mut ctx).await
}
