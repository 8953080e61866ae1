use crate::error::AlertDeckError;
use actix_web::{
    http::{header, StatusCode},
    HttpResponse,
};
use minijinja::Environment;
use serde::Serialize;

const TEMPLATES: [(&str, &str); 4] = [
    ("base.html", include_str!("../../templates/base.html")),
    ("alerts.html", include_str!("../../templates/alerts.html")),
    ("alert_form.html", include_str!("../../templates/alert_form.html")),
    ("events.html", include_str!("../../templates/events.html")),
];

/// The compiled page templates. Built once at startup and shared by every
/// worker.
pub struct Pages {
    env: Environment<'static>,
}

impl Pages {
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        for (name, source) in TEMPLATES {
            env.add_template(name, source)?;
        }
        Ok(Self { env })
    }

    /// Renders a page. Pages always reflect the current platform state and
    /// are never cached.
    pub fn render<S: Serialize>(
        &self,
        name: &str,
        status: StatusCode,
        ctx: S,
    ) -> Result<HttpResponse, AlertDeckError> {
        let html = self.env.get_template(name)?.render(ctx)?;

        Ok(HttpResponse::build(status)
            .insert_header((header::CONTENT_TYPE, "text/html; charset=utf-8"))
            .insert_header((header::CACHE_CONTROL, "no-store"))
            .body(html))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use actix_web::body::MessageBody;
    use minijinja::context;

    #[test]
    fn pages_are_escaped_and_not_cached() {
        let pages = Pages::new().expect("Templates to compile");
        let res = pages
            .render(
                "alerts.html",
                StatusCode::OK,
                context! {
                    alerts => vec![context! {
                        id => "disk-full",
                        description => "<b>disk</b>",
                        events => vec!["server:alert"],
                        channels => vec!["email"],
                        frequency => "Weekly",
                    }],
                },
            )
            .expect("Page to render");

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            res.headers().get(header::CACHE_CONTROL).unwrap(),
            "no-store"
        );
        let body = res.into_body().try_into_bytes().expect("Body to be bytes");
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(html.contains("disk-full"));
        assert!(html.contains("&lt;b&gt;disk"));
        assert!(!html.contains("<b>disk"));
    }
}
