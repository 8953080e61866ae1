use thiserror::Error;
use tracing::warn;
use url::Url;

pub const DEFAULT_KNOCK_API_URL: &str = "https://api.knock.app/v1";
const DEFAULT_PORT: usize = 5000;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("The {0} environment variable must be set")]
    MissingVar(&'static str),
    #[error("The {var} environment variable is not a valid url: {reason}")]
    InvalidUrl { var: &'static str, reason: String },
}

#[derive(Clone)]
pub struct Config {
    /// Port for the application to run on
    pub port: usize,
    /// Base url of the notification platform REST api
    pub api_url: Url,
    /// Secret api key for the notification platform
    pub api_key: String,
    /// Object collection the alerts are stored in
    pub alert_collection: String,
    /// Workflow that is triggered when an alert fires
    pub alert_workflow_key: String,
}

impl Config {
    pub fn new<T: Into<String>>(api_key: T, alert_collection: T, alert_workflow_key: T) -> Self {
        Self {
            port: DEFAULT_PORT,
            api_url: default_api_url(),
            api_key: api_key.into(),
            alert_collection: alert_collection.into(),
            alert_workflow_key: alert_workflow_key.into(),
        }
    }

    /// Reads the configuration from the environment
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = required_var("KNOCK_API_KEY")?;
        let alert_collection = required_var("KNOCK_ALERT_COLLECTION")?;
        let alert_workflow_key = required_var("KNOCK_ALERT_WORKFLOW_KEY")?;

        let mut config = Self::new(api_key, alert_collection, alert_workflow_key);

        if let Ok(api_url) = std::env::var("KNOCK_API_URL") {
            config.api_url = Url::parse(&api_url).map_err(|e| ConfigError::InvalidUrl {
                var: "KNOCK_API_URL",
                reason: e.to_string(),
            })?;
        }

        if let Ok(port) = std::env::var("PORT") {
            config.port = match port.parse::<usize>() {
                Ok(port) => port,
                Err(_) => {
                    warn!(
                        "The given PORT: {} is not valid, falling back to the default port: {}.",
                        port, DEFAULT_PORT
                    );
                    DEFAULT_PORT
                }
            };
        }

        Ok(config)
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("api_url", &self.api_url.as_str())
            .field("api_key", &"<redacted>")
            .field("alert_collection", &self.alert_collection)
            .field("alert_workflow_key", &self.alert_workflow_key)
            .finish()
    }
}

fn required_var(name: &'static str) -> Result<String, ConfigError> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingVar(name)),
    }
}

fn default_api_url() -> Url {
    match Url::parse(DEFAULT_KNOCK_API_URL) {
        Ok(url) => url,
        Err(_) => unreachable!("Default api url is a valid url"),
    }
}
