use crate::{
    error::AlertDeckError,
    shared::{
        render::Pages,
        usecase::{execute, UseCase},
    },
};
use actix_web::{http::StatusCode, web, HttpResponse};
use alertdeck_api_structs::dtos::AlertFormDTO;
use alertdeck_domain::User;
use alertdeck_infra::{AlertDeckContext, NotificationApiError};
use minijinja::context;

pub async fn new_alert_controller(
    ctx: web::Data<AlertDeckContext>,
    pages: web::Data<Pages>,
) -> Result<HttpResponse, AlertDeckError> {
    let users = execute(ListUsersUseCase, &ctx)
        .await
        .map_err(AlertDeckError::from)?;

    let form = AlertFormDTO::new_alert(default_alert_id(), &users);
    pages.render("alert_form.html", StatusCode::OK, context! { form })
}

fn default_alert_id() -> String {
    format!("alert_{}", uuid::Uuid::new_v4())
}

/// Lists the users that can be picked as alert recipients
#[derive(Debug)]
pub struct ListUsersUseCase;

#[derive(Debug)]
pub enum UseCaseError {
    PlatformError(NotificationApiError),
}

impl From<UseCaseError> for AlertDeckError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::PlatformError(e) => e.into(),
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for ListUsersUseCase {
    type Response = Vec<User>;

    type Error = UseCaseError;

    const NAME: &'static str = "ListUsers";

    async fn execute(&mut self, ctx: &AlertDeckContext) -> Result<Self::Response, Self::Error> {
        ctx.knock
            .list_users()
            .await
            .map_err(UseCaseError::PlatformError)
    }
}
