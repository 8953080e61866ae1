mod inmemory;
mod rest_api;

use alertdeck_domain::{AlertObject, AlertProperties, MalformedAlertError, Recipient, User};
pub use inmemory::{InMemoryKnock, PlatformCall, PlatformOperation, WorkflowRun};
pub use rest_api::KnockRestApi;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum NotificationApiError {
    #[error("404 Not found: {0}")]
    NotFound(String),
    #[error("The notification platform rejected the api key")]
    Unauthorized,
    #[error("Could not reach the notification platform: {0}")]
    Network(String),
    #[error("The notification platform responded with status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },
    #[error("Unexpected response from the notification platform: {0}")]
    MalformedResponse(String),
}

pub type PlatformResult<T> = Result<T, NotificationApiError>;

/// An object as returned by the notification platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformObject {
    pub id: String,
    #[serde(default)]
    pub collection: String,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl PlatformObject {
    pub fn to_alert(&self) -> Result<AlertObject, MalformedAlertError> {
        Ok(AlertObject {
            id: self.id.clone(),
            properties: AlertProperties::from_json(&self.properties)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionRecipient {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub recipient: SubscriptionRecipient,
}

/// Body of a workflow trigger
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowTrigger {
    pub recipients: Vec<Recipient>,
    pub data: Value,
}

/// The object, subscription, user and workflow operations of the notification
/// platform that the dashboard depends on
#[async_trait::async_trait]
pub trait INotificationPlatform: Send + Sync {
    /// Creates the object or replaces its properties
    async fn set_object(
        &self,
        collection: &str,
        id: &str,
        properties: &Map<String, Value>,
    ) -> PlatformResult<PlatformObject>;
    async fn get_object(&self, collection: &str, id: &str) -> PlatformResult<PlatformObject>;
    async fn delete_object(&self, collection: &str, id: &str) -> PlatformResult<()>;
    async fn list_objects(&self, collection: &str) -> PlatformResult<Vec<PlatformObject>>;
    async fn list_subscriptions(
        &self,
        collection: &str,
        id: &str,
    ) -> PlatformResult<Vec<Subscription>>;
    async fn add_subscriptions(
        &self,
        collection: &str,
        id: &str,
        recipients: &[String],
    ) -> PlatformResult<()>;
    async fn delete_subscriptions(
        &self,
        collection: &str,
        id: &str,
        recipients: &[String],
    ) -> PlatformResult<()>;
    async fn list_users(&self) -> PlatformResult<Vec<User>>;
    /// Returns the id of the workflow run that was started
    async fn trigger_workflow(
        &self,
        workflow_key: &str,
        trigger: &WorkflowTrigger,
    ) -> PlatformResult<String>;
}
