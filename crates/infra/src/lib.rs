mod config;
mod services;

pub use config::{Config, ConfigError, DEFAULT_KNOCK_API_URL};
pub use services::knock::*;
use std::sync::Arc;
use tracing::info;

/// Everything a request needs, created once at startup and shared by all
/// workers
#[derive(Clone)]
pub struct AlertDeckContext {
    pub knock: Arc<dyn INotificationPlatform>,
    pub config: Config,
}

impl AlertDeckContext {
    pub fn new(knock: Arc<dyn INotificationPlatform>, config: Config) -> Self {
        Self { knock, config }
    }

    /// Context backed by the given in memory platform, for tests and local runs
    pub fn create_inmemory(knock: Arc<InMemoryKnock>) -> Self {
        Self::new(knock, Config::new("sk_test", "alerts", "alert-fired"))
    }
}

/// Will setup the infrastructure context given the environment
pub fn setup_context() -> Result<AlertDeckContext, ConfigError> {
    let config = Config::from_env()?;
    info!(
        "Using notification platform at {} with alert collection: {}",
        config.api_url, config.alert_collection
    );
    let knock = KnockRestApi::new(config.api_url.clone(), config.api_key.clone());

    Ok(AlertDeckContext::new(Arc::new(knock), config))
}
