use super::{
    INotificationPlatform, NotificationApiError, PlatformObject, PlatformResult, Subscription,
    WorkflowTrigger,
};
use alertdeck_domain::User;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, error};
use url::Url;

/// Largest page the list endpoints hand out
const PAGE_SIZE: &str = "50";

#[derive(Debug, Deserialize)]
struct Page<T> {
    entries: Vec<T>,
    #[serde(default)]
    page_info: PageInfo,
}

#[derive(Debug, Default, Deserialize)]
struct PageInfo {
    #[serde(default)]
    after: Option<String>,
}

#[derive(Debug, Serialize)]
struct SubscriptionsRequest<'a> {
    recipients: &'a [String],
}

#[derive(Debug, Deserialize)]
struct TriggerResponse {
    workflow_run_id: String,
}

/// Notification platform client speaking to the hosted REST api.
///
/// Holds a single `reqwest::Client` so that connections are pooled across
/// requests. Clone the surrounding `Arc` rather than creating new clients.
pub struct KnockRestApi {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl KnockRestApi {
    pub fn new(base_url: Url, api_key: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
            api_key,
        }
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .bearer_auth(&self.api_key)
            .header("accept", "application/json")
    }

    /// Sends the request and maps unsuccessful status codes to errors
    async fn send(&self, request: RequestBuilder, resource: &str) -> PlatformResult<Response> {
        let res = request.send().await.map_err(|e| {
            error!(
                "[Network Error] Notification platform request for {} failed. Error message: {:?}",
                resource, e
            );
            NotificationApiError::Network(e.to_string())
        })?;

        let status = res.status();
        if status.is_success() {
            return Ok(res);
        }
        match status {
            StatusCode::NOT_FOUND => Err(NotificationApiError::NotFound(resource.to_string())),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(NotificationApiError::Unauthorized)
            }
            _ => {
                let body = res.text().await.unwrap_or_default();
                error!(
                    "[Unexpected Response] Notification platform responded with {} for {}: {}",
                    status, resource, body
                );
                Err(NotificationApiError::UnexpectedStatus {
                    status: status.as_u16(),
                    body,
                })
            }
        }
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        resource: &str,
    ) -> PlatformResult<T> {
        let res = self.send(request, resource).await?;
        res.json::<T>().await.map_err(|e| {
            error!(
                "[Unexpected Response] Could not decode notification platform response for {}. Error message: {:?}",
                resource, e
            );
            NotificationApiError::MalformedResponse(e.to_string())
        })
    }

    /// Follows the `after` cursor until every page has been read
    async fn list_all<T: DeserializeOwned>(&self, url: Url, resource: &str) -> PlatformResult<Vec<T>> {
        let mut entries = Vec::new();
        let mut after: Option<String> = None;

        loop {
            let mut page_url = url.clone();
            {
                let mut query = page_url.query_pairs_mut();
                query.append_pair("page_size", PAGE_SIZE);
                if let Some(cursor) = &after {
                    query.append_pair("after", cursor);
                }
            }

            let page: Page<T> = self
                .send_json(self.request(Method::GET, page_url), resource)
                .await?;
            entries.extend(page.entries);

            match page.page_info.after {
                Some(next) if !next.is_empty() && after.as_ref() != Some(&next) => {
                    after = Some(next)
                }
                _ => break,
            }
        }

        Ok(entries)
    }
}

#[async_trait::async_trait]
impl INotificationPlatform for KnockRestApi {
    async fn set_object(
        &self,
        collection: &str,
        id: &str,
        properties: &Map<String, Value>,
    ) -> PlatformResult<PlatformObject> {
        debug!("Setting object {}/{}", collection, id);
        let url = self.url(&["objects", collection, id]);
        self.send_json(
            self.request(Method::PUT, url).json(properties),
            &format!("object {}/{}", collection, id),
        )
        .await
    }

    async fn get_object(&self, collection: &str, id: &str) -> PlatformResult<PlatformObject> {
        let url = self.url(&["objects", collection, id]);
        self.send_json(
            self.request(Method::GET, url),
            &format!("object {}/{}", collection, id),
        )
        .await
    }

    async fn delete_object(&self, collection: &str, id: &str) -> PlatformResult<()> {
        debug!("Deleting object {}/{}", collection, id);
        let url = self.url(&["objects", collection, id]);
        self.send(
            self.request(Method::DELETE, url),
            &format!("object {}/{}", collection, id),
        )
        .await
        .map(|_| ())
    }

    async fn list_objects(&self, collection: &str) -> PlatformResult<Vec<PlatformObject>> {
        let url = self.url(&["objects", collection]);
        self.list_all(url, &format!("collection {}", collection))
            .await
    }

    async fn list_subscriptions(
        &self,
        collection: &str,
        id: &str,
    ) -> PlatformResult<Vec<Subscription>> {
        let url = self.url(&["objects", collection, id, "subscriptions"]);
        self.list_all(url, &format!("subscriptions of {}/{}", collection, id))
            .await
    }

    async fn add_subscriptions(
        &self,
        collection: &str,
        id: &str,
        recipients: &[String],
    ) -> PlatformResult<()> {
        debug!("Subscribing {:?} to {}/{}", recipients, collection, id);
        let url = self.url(&["objects", collection, id, "subscriptions"]);
        self.send(
            self.request(Method::POST, url)
                .json(&SubscriptionsRequest { recipients }),
            &format!("subscriptions of {}/{}", collection, id),
        )
        .await
        .map(|_| ())
    }

    async fn delete_subscriptions(
        &self,
        collection: &str,
        id: &str,
        recipients: &[String],
    ) -> PlatformResult<()> {
        debug!("Unsubscribing {:?} from {}/{}", recipients, collection, id);
        let url = self.url(&["objects", collection, id, "subscriptions"]);
        self.send(
            self.request(Method::DELETE, url)
                .json(&SubscriptionsRequest { recipients }),
            &format!("subscriptions of {}/{}", collection, id),
        )
        .await
        .map(|_| ())
    }

    async fn list_users(&self) -> PlatformResult<Vec<User>> {
        self.list_all(self.url(&["users"]), "users").await
    }

    async fn trigger_workflow(
        &self,
        workflow_key: &str,
        trigger: &WorkflowTrigger,
    ) -> PlatformResult<String> {
        debug!("Triggering workflow {}", workflow_key);
        let url = self.url(&["workflows", workflow_key, "trigger"]);
        let res: TriggerResponse = self
            .send_json(
                self.request(Method::POST, url).json(trigger),
                &format!("workflow {}", workflow_key),
            )
            .await?;
        Ok(res.workflow_run_id)
    }
}
