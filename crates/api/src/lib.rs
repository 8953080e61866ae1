mod alert;
mod error;
mod event;
mod shared;
mod status;

use actix_web::{dev::Server, middleware, web, App, HttpServer};
use alertdeck_infra::AlertDeckContext;
use shared::render::Pages;
use std::io::{Error, ErrorKind};
use std::net::TcpListener;
use tracing_actix_web::TracingLogger;

pub use error::AlertDeckError;

pub fn configure_server_api(cfg: &mut web::ServiceConfig) {
    alert::configure_routes(cfg);
    event::configure_routes(cfg);
    status::configure_routes(cfg);
}

pub struct Application {
    server: Server,
    port: u16,
}

impl Application {
    pub async fn new(context: AlertDeckContext) -> Result<Self, std::io::Error> {
        let (server, port) = Application::configure_server(context).await?;

        Ok(Self { server, port })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    async fn configure_server(context: AlertDeckContext) -> Result<(Server, u16), std::io::Error> {
        let port = context.config.port;
        let address = format!("0.0.0.0:{}", port);
        let listener = TcpListener::bind(&address)?;
        let port = listener.local_addr()?.port();

        let pages = Pages::new().map_err(|e| Error::new(ErrorKind::InvalidData, e.to_string()))?;
        let pages = web::Data::new(pages);
        let context = web::Data::new(context);

        let server = HttpServer::new(move || {
            App::new()
                .wrap(middleware::Compress::default())
                .wrap(TracingLogger::default())
                .app_data(context.clone())
                .app_data(pages.clone())
                .configure(configure_server_api)
        })
        .listen(listener)?
        .workers(4)
        .run();

        Ok((server, port))
    }

    pub async fn start(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}
