use actix_web::{
    http::{header, StatusCode},
    HttpResponse,
};
use alertdeck_infra::NotificationApiError;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum AlertDeckError {
    #[error("Internal server error")]
    InternalError,
    #[error("Invalid data provided: Error message: `{0}`")]
    BadClientData(String),
    #[error("404 Not found. Error message: `{0}`")]
    NotFound(String),
    #[error("The notification platform could not complete the request. Error message: `{0}`")]
    ExternalService(String),
}

impl actix_web::error::ResponseError for AlertDeckError {
    fn status_code(&self) -> StatusCode {
        match *self {
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BadClientData(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::ExternalService(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header((header::CONTENT_TYPE, "text/html; charset=utf-8"))
            .insert_header((header::CACHE_CONTROL, "no-store"))
            .body(self.to_string())
    }
}

impl From<NotificationApiError> for AlertDeckError {
    fn from(e: NotificationApiError) -> Self {
        match e {
            NotificationApiError::NotFound(what) => Self::NotFound(what),
            e => Self::ExternalService(e.to_string()),
        }
    }
}

impl From<minijinja::Error> for AlertDeckError {
    fn from(e: minijinja::Error) -> Self {
        error!("Unable to render page: {:?}", e);
        Self::InternalError
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use actix_web::ResponseError;

    #[test]
    fn platform_errors_map_to_status_codes() {
        let not_found = AlertDeckError::from(NotificationApiError::NotFound("alert".into()));
        assert_eq!(not_found.status_code(), StatusCode::NOT_FOUND);

        let network = AlertDeckError::from(NotificationApiError::Network("timeout".into()));
        assert_eq!(network.status_code(), StatusCode::BAD_GATEWAY);

        let rejected = AlertDeckError::from(NotificationApiError::UnexpectedStatus {
            status: 422,
            body: "bad".into(),
        });
        assert_eq!(rejected.status_code(), StatusCode::BAD_GATEWAY);
    }
}
