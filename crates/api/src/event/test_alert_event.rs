use crate::{
    error::AlertDeckError,
    shared::{
        forms::field_errors,
        render::Pages,
        usecase::{execute, UseCase},
    },
};
use actix_web::{http::StatusCode, web, HttpResponse};
use alertdeck_api_structs::{
    dtos::{FieldErrors, SentEventDTO, TestEventFormDTO},
    test_alert_event::RequestBody,
};
use alertdeck_domain::{AlertObject, EventType, Recipient};
use alertdeck_infra::{AlertDeckContext, NotificationApiError, WorkflowTrigger};
use minijinja::context;
use serde_json::{json, Value};
use tracing::warn;
use validator::Validate;

pub async fn test_event_form_controller(
    ctx: web::Data<AlertDeckContext>,
    pages: web::Data<Pages>,
) -> Result<HttpResponse, AlertDeckError> {
    let alerts = list_alerts(&ctx).await?;
    let form = TestEventFormDTO::new(&alerts, None, None);
    pages.render("events.html", StatusCode::OK, context! { form })
}

pub async fn send_test_event_controller(
    body: web::Bytes,
    ctx: web::Data<AlertDeckContext>,
    pages: web::Data<Pages>,
) -> Result<HttpResponse, AlertDeckError> {
    let body = RequestBody::from_form(&body);

    let event = match parse_submission(&body) {
        Ok(event) => event,
        Err(errors) => {
            let alerts = list_alerts(&ctx).await?;
            let mut form = TestEventFormDTO::new(
                &alerts,
                Some(body.alert_id.as_str()),
                body.event_type.as_deref(),
            );
            form.errors = errors;
            return pages.render(
                "events.html",
                StatusCode::UNPROCESSABLE_ENTITY,
                context! { form },
            );
        }
    };

    let usecase = TestAlertEventUseCase {
        collection: ctx.config.alert_collection.clone(),
        workflow_key: ctx.config.alert_workflow_key.clone(),
        alert_id: body.alert_id.clone(),
        event,
    };
    let workflow_run_id = execute(usecase, &ctx).await.map_err(AlertDeckError::from)?;

    // The run already exists, so a failed picker refresh must not hide its id
    let alerts = match list_alerts(&ctx).await {
        Ok(alerts) => alerts,
        Err(e) => {
            warn!("Showing an empty alert picker after the test event: {}", e);
            Vec::new()
        }
    };
    let mut form = TestEventFormDTO::new(
        &alerts,
        Some(body.alert_id.as_str()),
        Some(event.as_str()),
    );
    form.sent = Some(SentEventDTO {
        alert_id: body.alert_id,
        event: event.to_string(),
        workflow_run_id,
    });
    pages.render("events.html", StatusCode::OK, context! { form })
}

fn parse_submission(body: &RequestBody) -> Result<EventType, FieldErrors> {
    let mut errors = match body.validate() {
        Ok(_) => FieldErrors::new(),
        Err(e) => field_errors(&e),
    };
    let event = body.event_type.as_deref().map(str::parse::<EventType>);
    if let Some(Err(_)) = event {
        errors.insert(
            "eventType".into(),
            "You need to select a notification type.".into(),
        );
    }

    match event {
        Some(Ok(event)) if errors.is_empty() => Ok(event),
        _ => Err(errors),
    }
}

/// Every alert in the collection, to pick the one to fire
async fn list_alerts(ctx: &AlertDeckContext) -> Result<Vec<AlertObject>, AlertDeckError> {
    let objects = ctx
        .knock
        .list_objects(&ctx.config.alert_collection)
        .await?;

    Ok(objects.iter().filter_map(|o| o.to_alert().ok()).collect())
}

/// Fires the alert workflow for a stored alert, as if the alert had been
/// raised with the given event type
#[derive(Debug)]
struct TestAlertEventUseCase {
    pub collection: String,
    pub workflow_key: String,
    pub alert_id: String,
    pub event: EventType,
}

#[derive(Debug)]
enum UseCaseError {
    NotFound(String),
    PlatformError(NotificationApiError),
}

impl From<UseCaseError> for AlertDeckError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::NotFound(alert_id) => Self::NotFound(format!(
                "The alert with id: {}, was not found.",
                alert_id
            )),
            UseCaseError::PlatformError(e) => e.into(),
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for TestAlertEventUseCase {
    /// Id of the started workflow run
    type Response = String;

    type Error = UseCaseError;

    const NAME: &'static str = "TestAlertEvent";

    async fn execute(&mut self, ctx: &AlertDeckContext) -> Result<Self::Response, Self::Error> {
        let object = match ctx.knock.get_object(&self.collection, &self.alert_id).await {
            Ok(object) => object,
            Err(NotificationApiError::NotFound(_)) => {
                return Err(UseCaseError::NotFound(self.alert_id.clone()))
            }
            Err(e) => return Err(UseCaseError::PlatformError(e)),
        };

        let trigger = WorkflowTrigger {
            recipients: vec![Recipient::Object {
                id: self.alert_id.clone(),
                collection: self.collection.clone(),
            }],
            data: json!({
                "alert": Value::Object(object.properties),
                "event": self.event.as_str(),
            }),
        };

        ctx.knock
            .trigger_workflow(&self.workflow_key, &trigger)
            .await
            .map_err(UseCaseError::PlatformError)
    }
}
