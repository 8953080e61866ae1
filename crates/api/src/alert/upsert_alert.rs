use super::new_alert::ListUsersUseCase;
use crate::{
    error::AlertDeckError,
    shared::{
        forms::field_errors,
        render::Pages,
        usecase::{execute, UseCase},
    },
};
use actix_web::{
    http::{header, StatusCode},
    web, HttpResponse,
};
use alertdeck_api_structs::{
    dtos::{AlertFormDTO, FieldErrors},
    upsert_alert::RequestBody,
};
use alertdeck_domain::{
    slugify, AlertDraft, AlertObject, Channel, EventType, Frequency, RecipientChanges,
};
use alertdeck_infra::{AlertDeckContext, NotificationApiError};
use minijinja::context;
use serde_json::{Map, Value};
use tracing::{error, warn};
use validator::Validate;

pub async fn upsert_alert_controller(
    body: web::Bytes,
    ctx: web::Data<AlertDeckContext>,
    pages: web::Data<Pages>,
) -> Result<HttpResponse, AlertDeckError> {
    let body = RequestBody::from_form(&body);

    let (draft, changes) = match parse_submission(&body) {
        Ok(submission) => submission,
        Err(errors) => {
            let users = execute(ListUsersUseCase, &ctx)
                .await
                .map_err(AlertDeckError::from)?;
            let form = AlertFormDTO::resubmit(&body, &users, errors);
            return pages.render(
                "alert_form.html",
                StatusCode::UNPROCESSABLE_ENTITY,
                context! { form },
            );
        }
    };

    let usecase = UpsertAlertUseCase {
        collection: ctx.config.alert_collection.clone(),
        draft,
        changes,
    };

    execute(usecase, &ctx)
        .await
        .map(|alert| {
            HttpResponse::SeeOther()
                .insert_header((header::LOCATION, format!("/?saved={}", alert.id)))
                .finish()
        })
        .map_err(AlertDeckError::from)
}

/// Checks the submitted form and turns it into the alert to write and the
/// subscription changes to apply
fn parse_submission(body: &RequestBody) -> Result<(AlertDraft, RecipientChanges), FieldErrors> {
    let mut errors = match body.validate() {
        Ok(_) => FieldErrors::new(),
        Err(e) => field_errors(&e),
    };
    if slugify(&body.id).is_empty() {
        errors
            .entry("id".into())
            .or_insert_with(|| "Alert ID should be a valid JSON property name".into());
    }

    let events = body
        .events
        .iter()
        .map(|e| e.parse::<EventType>())
        .collect::<Result<Vec<_>, _>>();
    if let Err(e) = &events {
        errors.entry("events".into()).or_insert_with(|| e.to_string());
    }
    let channels = body
        .channels
        .iter()
        .map(|c| c.parse::<Channel>())
        .collect::<Result<Vec<_>, _>>();
    if let Err(e) = &channels {
        errors.entry("channels".into()).or_insert_with(|| e.to_string());
    }
    let frequency = body.frequency.parse::<Frequency>();
    if frequency.is_err() {
        errors.insert(
            "frequency".into(),
            "You need to select a notification frequency.".into(),
        );
    }

    match (events, channels, frequency) {
        (Ok(events), Ok(channels), Ok(frequency)) if errors.is_empty() => {
            let draft = AlertDraft {
                name: body.id.clone(),
                description: body.description.clone(),
                events,
                channels,
                frequency,
            };
            let changes = RecipientChanges::from_selection(
                body.recipients.clone(),
                &body.initial_recipients,
                body.removed_recipients.clone(),
            );
            Ok((draft, changes))
        }
        _ => Err(errors),
    }
}

/// Writes an alert and reconciles its subscriptions.
///
/// The steps run in order: snapshot the stored alert and its subscribers,
/// write the properties, detach `changes.removed`, attach
/// `changes.recipients`. When a subscription
/// step fails the earlier steps are undone before the error is returned.
#[derive(Debug)]
pub struct UpsertAlertUseCase {
    pub collection: String,
    pub draft: AlertDraft,
    pub changes: RecipientChanges,
}

#[derive(Debug)]
pub enum UseCaseError {
    InvalidId(String),
    PlatformError(NotificationApiError),
}

impl From<UseCaseError> for AlertDeckError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::InvalidId(id) => Self::BadClientData(format!(
                "The alert id: {:?} does not contain any usable characters",
                id
            )),
            UseCaseError::PlatformError(e) => e.into(),
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for UpsertAlertUseCase {
    type Response = AlertObject;

    type Error = UseCaseError;

    const NAME: &'static str = "UpsertAlert";

    async fn execute(&mut self, ctx: &AlertDeckContext) -> Result<Self::Response, Self::Error> {
        let alert = self.draft.clone().into_object();
        if alert.id.is_empty() {
            return Err(UseCaseError::InvalidId(self.draft.name.clone()));
        }

        let previous = match ctx.knock.get_object(&self.collection, &alert.id).await {
            Ok(object) => Some(object.properties),
            Err(NotificationApiError::NotFound(_)) => None,
            Err(e) => return Err(UseCaseError::PlatformError(e)),
        };

        // Only these can be re-subscribed on rollback, the removal list may
        // name ids that were never subscribed
        let detached: Vec<String> = if previous.is_some() && !self.changes.removed.is_empty() {
            let subscribers: Vec<String> = ctx
                .knock
                .list_subscriptions(&self.collection, &alert.id)
                .await
                .map_err(UseCaseError::PlatformError)?
                .into_iter()
                .map(|s| s.recipient.id)
                .collect();
            self.changes
                .removed
                .iter()
                .filter(|id| subscribers.contains(id))
                .cloned()
                .collect()
        } else {
            Vec::new()
        };

        ctx.knock
            .set_object(&self.collection, &alert.id, &alert.properties.to_json())
            .await
            .map_err(UseCaseError::PlatformError)?;

        if !self.changes.removed.is_empty() {
            if let Err(e) = ctx
                .knock
                .delete_subscriptions(&self.collection, &alert.id, &self.changes.removed)
                .await
            {
                self.compensate(ctx, &alert.id, previous, &[]).await;
                return Err(UseCaseError::PlatformError(e));
            }
        }

        if !self.changes.recipients.is_empty() {
            if let Err(e) = ctx
                .knock
                .add_subscriptions(&self.collection, &alert.id, &self.changes.recipients)
                .await
            {
                self.compensate(ctx, &alert.id, previous, &detached).await;
                return Err(UseCaseError::PlatformError(e));
            }
        }

        Ok(alert)
    }
}

impl UpsertAlertUseCase {
    /// Best effort rollback of the steps that already went through
    async fn compensate(
        &self,
        ctx: &AlertDeckContext,
        alert_id: &str,
        previous: Option<Map<String, Value>>,
        detached: &[String],
    ) {
        warn!("Rolling back the upsert of alert: {}", alert_id);

        if !detached.is_empty() {
            if let Err(e) = ctx
                .knock
                .add_subscriptions(&self.collection, alert_id, detached)
                .await
            {
                error!(
                    "Unable to re-subscribe {:?} to alert: {}. Error: {:?}",
                    detached, alert_id, e
                );
            }
        }

        let restored = match previous {
            Some(properties) => ctx
                .knock
                .set_object(&self.collection, alert_id, &properties)
                .await
                .map(|_| ()),
            None => ctx.knock.delete_object(&self.collection, alert_id).await,
        };
        if let Err(e) = restored {
            error!("Unable to restore alert: {}. Error: {:?}", alert_id, e);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use alertdeck_domain::{AlertProperties, BatchWindow, Cadence};
    use alertdeck_infra::{InMemoryKnock, PlatformCall, PlatformOperation};
    use std::sync::Arc;

    fn ids(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    fn disk_full(description: &str) -> AlertDraft {
        AlertDraft {
            name: "Disk Full".into(),
            description: description.into(),
            events: vec![EventType::ServerAlert],
            channels: vec![Channel::Email],
            frequency: Frequency::Weekly,
        }
    }

    fn upsert(draft: AlertDraft, recipients: &[&str], removed: &[&str]) -> UpsertAlertUseCase {
        UpsertAlertUseCase {
            collection: "alerts".into(),
            draft,
            changes: RecipientChanges::new(ids(recipients), ids(removed)),
        }
    }

    fn setup() -> (Arc<InMemoryKnock>, AlertDeckContext) {
        let knock = Arc::new(InMemoryKnock::new());
        let ctx = AlertDeckContext::create_inmemory(knock.clone());
        (knock, ctx)
    }

    fn stored(knock: &InMemoryKnock, id: &str) -> AlertProperties {
        let object = knock.object("alerts", id).expect("Alert to be stored");
        AlertProperties::from_json(&object.properties).unwrap()
    }

    #[actix_web::test]
    async fn it_creates_the_alert_and_subscribes_recipients() {
        let (knock, ctx) = setup();

        let alert = upsert(disk_full("disk usage"), &["user_1"], &[])
            .execute(&ctx)
            .await
            .unwrap();
        assert_eq!(alert.id, "disk-full");

        let props = stored(&knock, "disk-full");
        assert_eq!(props.name, "Disk Full");
        assert_eq!(props.description, "disk usage");
        assert_eq!(props.frequency, Frequency::Weekly);
        let window: Option<&BatchWindow> = props.batch_window.as_ref();
        assert_eq!(window.map(|w| &w.cadence), Some(&Cadence::Weekly));
        assert_eq!(knock.subscribers("alerts", "disk-full"), vec!["user_1"]);
    }

    #[actix_web::test]
    async fn it_removes_before_it_adds() {
        let (knock, ctx) = setup();

        upsert(disk_full("disk usage"), &["a", "b"], &["b"])
            .execute(&ctx)
            .await
            .unwrap();

        let operations: Vec<_> = knock.calls().iter().map(|c| c.operation()).collect();
        assert_eq!(
            operations,
            vec![
                PlatformOperation::GetObject,
                PlatformOperation::SetObject,
                PlatformOperation::DeleteSubscriptions,
                PlatformOperation::AddSubscriptions,
            ]
        );
        assert_eq!(knock.subscribers("alerts", "disk-full"), vec!["a", "b"]);
    }

    #[actix_web::test]
    async fn it_only_writes_the_object_without_recipient_changes() {
        let (knock, ctx) = setup();

        upsert(disk_full("disk usage"), &[], &[])
            .execute(&ctx)
            .await
            .unwrap();

        assert_eq!(
            knock.calls(),
            vec![
                PlatformCall::GetObject {
                    collection: "alerts".into(),
                    id: "disk-full".into()
                },
                PlatformCall::SetObject {
                    collection: "alerts".into(),
                    id: "disk-full".into()
                },
            ]
        );
    }

    #[actix_web::test]
    async fn resubmitting_updates_the_same_alert() {
        let (knock, ctx) = setup();

        upsert(disk_full("first"), &[], &[]).execute(&ctx).await.unwrap();
        upsert(disk_full("second"), &[], &[]).execute(&ctx).await.unwrap();

        let objects = ctx.knock.list_objects("alerts").await.unwrap();
        assert_eq!(objects.len(), 1);
        assert_eq!(stored(&knock, "disk-full").description, "second");
    }

    #[actix_web::test]
    async fn it_rejects_ids_without_usable_characters() {
        let (knock, ctx) = setup();
        let mut draft = disk_full("disk usage");
        draft.name = "!!".into();

        let res = upsert(draft, &[], &[]).execute(&ctx).await;
        assert!(matches!(res, Err(UseCaseError::InvalidId(_))));
        assert!(knock.calls().is_empty());
    }

    #[actix_web::test]
    async fn it_deletes_a_new_alert_when_subscribing_fails() {
        let (knock, ctx) = setup();
        knock.fail(PlatformOperation::AddSubscriptions);

        let res = upsert(disk_full("disk usage"), &["user_1"], &[])
            .execute(&ctx)
            .await;

        assert!(matches!(
            res,
            Err(UseCaseError::PlatformError(NotificationApiError::Network(_)))
        ));
        assert!(knock.object("alerts", "disk-full").is_none());
    }

    #[actix_web::test]
    async fn it_restores_an_existing_alert_when_subscribing_fails() {
        let (knock, ctx) = setup();
        upsert(disk_full("original"), &["user_1", "user_2"], &[])
            .execute(&ctx)
            .await
            .unwrap();
        knock.fail(PlatformOperation::AddSubscriptions);

        let res = upsert(disk_full("changed"), &["user_3"], &["user_2"])
            .execute(&ctx)
            .await;
        assert!(res.is_err());

        knock.recover(PlatformOperation::AddSubscriptions);
        // Compensation could not re-subscribe while adding was failing
        assert_eq!(knock.subscribers("alerts", "disk-full"), vec!["user_1"]);
        assert_eq!(stored(&knock, "disk-full").description, "original");
    }

    #[actix_web::test]
    async fn rollback_only_resubscribes_previous_subscribers() {
        let (knock, ctx) = setup();
        upsert(disk_full("original"), &["user_1"], &[])
            .execute(&ctx)
            .await
            .unwrap();
        knock.fail_next(PlatformOperation::AddSubscriptions);

        let res = upsert(disk_full("changed"), &["user_3"], &["user_1", "ghost"])
            .execute(&ctx)
            .await;
        assert!(res.is_err());

        assert_eq!(knock.subscribers("alerts", "disk-full"), vec!["user_1"]);
        assert_eq!(stored(&knock, "disk-full").description, "original");
    }

    #[actix_web::test]
    async fn rollback_never_subscribes_unknown_ids_to_a_new_alert() {
        let (knock, ctx) = setup();
        knock.fail_next(PlatformOperation::AddSubscriptions);

        let res = upsert(disk_full("disk usage"), &["user_3"], &["ghost"])
            .execute(&ctx)
            .await;
        assert!(res.is_err());

        let resubscribed = knock.calls().iter().any(|c| match c {
            PlatformCall::AddSubscriptions { recipients, .. } => {
                recipients.iter().any(|id| id == "ghost")
            }
            _ => false,
        });
        assert!(!resubscribed);
        assert!(knock.object("alerts", "disk-full").is_none());
    }

    #[actix_web::test]
    async fn it_restores_the_alert_when_unsubscribing_fails() {
        let (knock, ctx) = setup();
        upsert(disk_full("original"), &["user_1"], &[])
            .execute(&ctx)
            .await
            .unwrap();
        knock.fail(PlatformOperation::DeleteSubscriptions);
        let earlier_calls = knock.calls().len();

        let res = upsert(disk_full("changed"), &["user_2"], &["user_1"])
            .execute(&ctx)
            .await;
        assert!(matches!(
            res,
            Err(UseCaseError::PlatformError(NotificationApiError::Network(_)))
        ));

        assert_eq!(stored(&knock, "disk-full").description, "original");
        assert_eq!(knock.subscribers("alerts", "disk-full"), vec!["user_1"]);
        assert!(!knock.calls()[earlier_calls..]
            .iter()
            .any(|c| c.operation() == PlatformOperation::AddSubscriptions));
    }

    #[actix_web::test]
    async fn compensation_resubscribes_detached_recipients() {
        let (knock, ctx) = setup();
        let mut usecase = upsert(disk_full("original"), &["user_1"], &[]);
        usecase.execute(&ctx).await.unwrap();
        let previous = knock.object("alerts", "disk-full").unwrap().properties;

        ctx.knock
            .delete_subscriptions("alerts", "disk-full", &ids(&["user_1"]))
            .await
            .unwrap();
        ctx.knock
            .set_object("alerts", "disk-full", &disk_full("changed").properties().to_json())
            .await
            .unwrap();

        usecase
            .compensate(&ctx, "disk-full", Some(previous), &ids(&["user_1"]))
            .await;
        assert_eq!(knock.subscribers("alerts", "disk-full"), vec!["user_1"]);
        assert_eq!(stored(&knock, "disk-full").description, "original");
    }

    #[test]
    fn it_derives_removals_from_the_initial_recipients() {
        let body = RequestBody::from_form(
            b"id=Disk+Full&description=disk+usage&events=server%3Aalert&channels=email\
              &frequency=Weekly&recipients=user_1&initialRecipients=user_1&initialRecipients=user_2",
        );
        let (draft, changes) = parse_submission(&body).unwrap();
        assert_eq!(draft.object_id(), "disk-full");
        assert_eq!(draft.frequency, Frequency::Weekly);
        assert_eq!(changes.recipients, ids(&["user_1"]));
        assert_eq!(changes.removed, ids(&["user_2"]));
    }

    #[test]
    fn it_reports_invalid_fields_inline() {
        let body = RequestBody::from_form(
            b"id=%21%21%21&description=x&events=server%3Apanic&frequency=Hourly",
        );
        let errors = parse_submission(&body).unwrap_err();
        assert_eq!(
            errors.get("id").map(String::as_str),
            Some("Alert ID should be a valid JSON property name")
        );
        assert_eq!(
            errors.get("description").map(String::as_str),
            Some("Description must be at least 2 characters.")
        );
        assert!(errors.contains_key("events"));
        assert_eq!(
            errors.get("channels").map(String::as_str),
            Some("You have to select at least one item.")
        );
        assert_eq!(
            errors.get("frequency").map(String::as_str),
            Some("You need to select a notification frequency.")
        );
    }
}
