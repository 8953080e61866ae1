use crate::{
    error::AlertDeckError,
    shared::{
        render::Pages,
        usecase::{execute, UseCase},
    },
};
use actix_web::{http::StatusCode, web, HttpResponse};
use alertdeck_api_structs::{dtos::AlertDTO, list_alerts::QueryParams};
use alertdeck_domain::AlertObject;
use alertdeck_infra::{AlertDeckContext, NotificationApiError};
use minijinja::context;
use tracing::warn;

pub async fn list_alerts_controller(
    query: web::Query<QueryParams>,
    ctx: web::Data<AlertDeckContext>,
    pages: web::Data<Pages>,
) -> Result<HttpResponse, AlertDeckError> {
    let usecase = ListAlertsUseCase {
        collection: ctx.config.alert_collection.clone(),
    };

    let alerts = match execute(usecase, &ctx).await {
        Ok(alerts) => alerts,
        Err(UseCaseError::PlatformError(e)) => {
            warn!("Showing an empty alert list: {}", e);
            Vec::new()
        }
    };
    let alerts: Vec<AlertDTO> = alerts.into_iter().map(AlertDTO::new).collect();

    pages.render(
        "alerts.html",
        StatusCode::OK,
        context! {
            alerts,
            saved => query.saved.clone(),
        },
    )
}

#[derive(Debug)]
struct ListAlertsUseCase {
    pub collection: String,
}

#[derive(Debug)]
enum UseCaseError {
    PlatformError(NotificationApiError),
}

#[async_trait::async_trait(?Send)]
impl UseCase for ListAlertsUseCase {
    type Response = Vec<AlertObject>;

    type Error = UseCaseError;

    const NAME: &'static str = "ListAlerts";

    async fn execute(&mut self, ctx: &AlertDeckContext) -> Result<Self::Response, Self::Error> {
        let objects = ctx
            .knock
            .list_objects(&self.collection)
            .await
            .map_err(UseCaseError::PlatformError)?;

        Ok(objects
            .iter()
            .filter_map(|object| match object.to_alert() {
                Ok(alert) => Some(alert),
                Err(e) => {
                    warn!("Skipping alert: {} in the list: {:?}", object.id, e);
                    None
                }
            })
            .collect())
    }
}
