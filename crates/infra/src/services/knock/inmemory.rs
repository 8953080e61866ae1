use super::{
    INotificationPlatform, NotificationApiError, PlatformObject, PlatformResult, Subscription,
    SubscriptionRecipient, WorkflowTrigger,
};
use alertdeck_domain::{Recipient, User};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, MutexGuard};

/// Kind of operation issued against the notification platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlatformOperation {
    SetObject,
    GetObject,
    DeleteObject,
    ListObjects,
    ListSubscriptions,
    AddSubscriptions,
    DeleteSubscriptions,
    ListUsers,
    TriggerWorkflow,
}

/// A call received by the [`InMemoryKnock`], kept in arrival order
#[derive(Debug, Clone, PartialEq)]
pub enum PlatformCall {
    SetObject { collection: String, id: String },
    GetObject { collection: String, id: String },
    DeleteObject { collection: String, id: String },
    ListObjects { collection: String },
    ListSubscriptions { collection: String, id: String },
    AddSubscriptions { collection: String, id: String, recipients: Vec<String> },
    DeleteSubscriptions { collection: String, id: String, recipients: Vec<String> },
    ListUsers,
    TriggerWorkflow { workflow_key: String },
}

impl PlatformCall {
    pub fn operation(&self) -> PlatformOperation {
        match self {
            Self::SetObject { .. } => PlatformOperation::SetObject,
            Self::GetObject { .. } => PlatformOperation::GetObject,
            Self::DeleteObject { .. } => PlatformOperation::DeleteObject,
            Self::ListObjects { .. } => PlatformOperation::ListObjects,
            Self::ListSubscriptions { .. } => PlatformOperation::ListSubscriptions,
            Self::AddSubscriptions { .. } => PlatformOperation::AddSubscriptions,
            Self::DeleteSubscriptions { .. } => PlatformOperation::DeleteSubscriptions,
            Self::ListUsers => PlatformOperation::ListUsers,
            Self::TriggerWorkflow { .. } => PlatformOperation::TriggerWorkflow,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowRun {
    pub id: String,
    pub workflow_key: String,
    pub recipients: Vec<Recipient>,
    pub data: Value,
}

type ObjectKey = (String, String);

#[derive(Default)]
struct State {
    objects: BTreeMap<ObjectKey, PlatformObject>,
    subscriptions: BTreeMap<ObjectKey, Vec<String>>,
    users: Vec<User>,
    workflow_runs: Vec<WorkflowRun>,
    calls: Vec<PlatformCall>,
    failing: HashSet<PlatformOperation>,
    failing_once: HashSet<PlatformOperation>,
}

/// Notification platform kept in process memory.
///
/// Used when running tests and for local development without platform
/// credentials. Every call is recorded, and operations can be made to fail to
/// exercise error paths.
#[derive(Default)]
pub struct InMemoryKnock {
    state: Mutex<State>,
}

fn key(collection: &str, id: &str) -> ObjectKey {
    (collection.to_string(), id.to_string())
}

fn not_found_object(collection: &str, id: &str) -> NotificationApiError {
    NotificationApiError::NotFound(format!("object {}/{}", collection, id))
}

impl InMemoryKnock {
    pub fn new() -> Self {
        Default::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Records the call and fails it if its operation was marked as failing
    fn receive(&self, call: PlatformCall) -> PlatformResult<MutexGuard<'_, State>> {
        let mut state = self.state();
        let operation = call.operation();
        state.calls.push(call);
        if state.failing.contains(&operation) || state.failing_once.remove(&operation) {
            return Err(NotificationApiError::Network(format!(
                "Simulated failure of {:?}",
                operation
            )));
        }
        Ok(state)
    }

    pub fn add_user(&self, user: User) {
        let mut state = self.state();
        state.users.retain(|u| u.id != user.id);
        state.users.push(user);
    }

    /// Makes every following call of the operation fail with a network error
    pub fn fail(&self, operation: PlatformOperation) {
        self.state().failing.insert(operation);
    }

    /// Makes only the next call of the operation fail
    pub fn fail_next(&self, operation: PlatformOperation) {
        self.state().failing_once.insert(operation);
    }

    pub fn recover(&self, operation: PlatformOperation) {
        let mut state = self.state();
        state.failing.remove(&operation);
        state.failing_once.remove(&operation);
    }

    pub fn calls(&self) -> Vec<PlatformCall> {
        self.state().calls.clone()
    }

    pub fn object(&self, collection: &str, id: &str) -> Option<PlatformObject> {
        self.state().objects.get(&key(collection, id)).cloned()
    }

    pub fn subscribers(&self, collection: &str, id: &str) -> Vec<String> {
        self.state()
            .subscriptions
            .get(&key(collection, id))
            .cloned()
            .unwrap_or_default()
    }

    pub fn workflow_runs(&self) -> Vec<WorkflowRun> {
        self.state().workflow_runs.clone()
    }
}

#[async_trait::async_trait]
impl INotificationPlatform for InMemoryKnock {
    async fn set_object(
        &self,
        collection: &str,
        id: &str,
        properties: &Map<String, Value>,
    ) -> PlatformResult<PlatformObject> {
        let mut state = self.receive(PlatformCall::SetObject {
            collection: collection.into(),
            id: id.into(),
        })?;
        let object = PlatformObject {
            id: id.into(),
            collection: collection.into(),
            properties: properties.clone(),
        };
        state.objects.insert(key(collection, id), object.clone());
        Ok(object)
    }

    async fn get_object(&self, collection: &str, id: &str) -> PlatformResult<PlatformObject> {
        let state = self.receive(PlatformCall::GetObject {
            collection: collection.into(),
            id: id.into(),
        })?;
        state
            .objects
            .get(&key(collection, id))
            .cloned()
            .ok_or_else(|| not_found_object(collection, id))
    }

    async fn delete_object(&self, collection: &str, id: &str) -> PlatformResult<()> {
        let mut state = self.receive(PlatformCall::DeleteObject {
            collection: collection.into(),
            id: id.into(),
        })?;
        state.subscriptions.remove(&key(collection, id));
        state
            .objects
            .remove(&key(collection, id))
            .map(|_| ())
            .ok_or_else(|| not_found_object(collection, id))
    }

    async fn list_objects(&self, collection: &str) -> PlatformResult<Vec<PlatformObject>> {
        let state = self.receive(PlatformCall::ListObjects {
            collection: collection.into(),
        })?;
        Ok(state
            .objects
            .values()
            .filter(|o| o.collection == collection)
            .cloned()
            .collect())
    }

    async fn list_subscriptions(
        &self,
        collection: &str,
        id: &str,
    ) -> PlatformResult<Vec<Subscription>> {
        let state = self.receive(PlatformCall::ListSubscriptions {
            collection: collection.into(),
            id: id.into(),
        })?;
        if !state.objects.contains_key(&key(collection, id)) {
            return Err(not_found_object(collection, id));
        }
        Ok(state
            .subscriptions
            .get(&key(collection, id))
            .map(|ids| {
                ids.iter()
                    .map(|id| Subscription {
                        recipient: SubscriptionRecipient { id: id.clone() },
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn add_subscriptions(
        &self,
        collection: &str,
        id: &str,
        recipients: &[String],
    ) -> PlatformResult<()> {
        let mut state = self.receive(PlatformCall::AddSubscriptions {
            collection: collection.into(),
            id: id.into(),
            recipients: recipients.to_vec(),
        })?;
        if !state.objects.contains_key(&key(collection, id)) {
            return Err(not_found_object(collection, id));
        }
        let subscribers = state.subscriptions.entry(key(collection, id)).or_default();
        for recipient in recipients {
            if !subscribers.contains(recipient) {
                subscribers.push(recipient.clone());
            }
        }
        Ok(())
    }

    async fn delete_subscriptions(
        &self,
        collection: &str,
        id: &str,
        recipients: &[String],
    ) -> PlatformResult<()> {
        let mut state = self.receive(PlatformCall::DeleteSubscriptions {
            collection: collection.into(),
            id: id.into(),
            recipients: recipients.to_vec(),
        })?;
        if !state.objects.contains_key(&key(collection, id)) {
            return Err(not_found_object(collection, id));
        }
        if let Some(subscribers) = state.subscriptions.get_mut(&key(collection, id)) {
            subscribers.retain(|s| !recipients.contains(s));
        }
        Ok(())
    }

    async fn list_users(&self) -> PlatformResult<Vec<User>> {
        let state = self.receive(PlatformCall::ListUsers)?;
        Ok(state.users.clone())
    }

    async fn trigger_workflow(
        &self,
        workflow_key: &str,
        trigger: &WorkflowTrigger,
    ) -> PlatformResult<String> {
        let mut state = self.receive(PlatformCall::TriggerWorkflow {
            workflow_key: workflow_key.into(),
        })?;
        let run = WorkflowRun {
            id: uuid::Uuid::new_v4().to_string(),
            workflow_key: workflow_key.into(),
            recipients: trigger.recipients.clone(),
            data: trigger.data.clone(),
        };
        let run_id = run.id.clone();
        state.workflow_runs.push(run);
        Ok(run_id)
    }
}
