use crate::{
    error::AlertDeckError,
    shared::{
        render::Pages,
        usecase::{execute, UseCase},
    },
};
use actix_web::{http::StatusCode, web, HttpResponse};
use alertdeck_api_structs::{dtos::AlertFormDTO, get_alert::PathParams};
use alertdeck_domain::{AlertObject, User};
use alertdeck_infra::{AlertDeckContext, NotificationApiError};
use minijinja::context;

pub async fn get_alert_controller(
    path: web::Path<PathParams>,
    ctx: web::Data<AlertDeckContext>,
    pages: web::Data<Pages>,
) -> Result<HttpResponse, AlertDeckError> {
    let usecase = GetAlertUseCase {
        collection: ctx.config.alert_collection.clone(),
        alert_id: path.alert_id.clone(),
    };

    let res = execute(usecase, &ctx).await.map_err(AlertDeckError::from)?;
    let form = AlertFormDTO::edit(&res.alert, res.subscribers, &res.users);
    pages.render("alert_form.html", StatusCode::OK, context! { form })
}

#[derive(Debug)]
struct GetAlertUseCase {
    pub collection: String,
    pub alert_id: String,
}

#[derive(Debug)]
struct UseCaseResponse {
    pub alert: AlertObject,
    pub subscribers: Vec<String>,
    pub users: Vec<User>,
}

#[derive(Debug)]
enum UseCaseError {
    NotFound(String),
    MalformedAlert(String),
    PlatformError(NotificationApiError),
}

impl From<UseCaseError> for AlertDeckError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::NotFound(alert_id) => Self::NotFound(format!(
                "The alert with id: {}, was not found.",
                alert_id
            )),
            UseCaseError::MalformedAlert(reason) => Self::ExternalService(reason),
            UseCaseError::PlatformError(e) => e.into(),
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetAlertUseCase {
    type Response = UseCaseResponse;

    type Error = UseCaseError;

    const NAME: &'static str = "GetAlert";

    async fn execute(&mut self, ctx: &AlertDeckContext) -> Result<Self::Response, Self::Error> {
        let object = match ctx.knock.get_object(&self.collection, &self.alert_id).await {
            Ok(object) => object,
            Err(NotificationApiError::NotFound(_)) => {
                return Err(UseCaseError::NotFound(self.alert_id.clone()))
            }
            Err(e) => return Err(UseCaseError::PlatformError(e)),
        };
        let alert = object
            .to_alert()
            .map_err(|e| UseCaseError::MalformedAlert(e.to_string()))?;

        let subscribers = ctx
            .knock
            .list_subscriptions(&self.collection, &self.alert_id)
            .await
            .map_err(UseCaseError::PlatformError)?
            .into_iter()
            .map(|s| s.recipient.id)
            .collect();

        let users = ctx
            .knock
            .list_users()
            .await
            .map_err(UseCaseError::PlatformError)?;

        Ok(UseCaseResponse {
            alert,
            subscribers,
            users,
        })
    }
}
