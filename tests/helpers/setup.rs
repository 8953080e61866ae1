use alertdeck_api::Application;
use alertdeck_infra::{AlertDeckContext, Config, InMemoryKnock};
use reqwest::{redirect::Policy, Client};
use std::sync::Arc;

pub struct TestApp {
    pub address: String,
    pub config: Config,
    pub knock: Arc<InMemoryKnock>,
    pub client: Client,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }
}

// Launch the application as a background task
pub async fn spawn_app() -> TestApp {
    let knock = Arc::new(InMemoryKnock::new());
    let mut ctx = AlertDeckContext::create_inmemory(knock.clone());
    ctx.config.port = 0; // Random port

    let config = ctx.config.clone();
    let application = Application::new(ctx)
        .await
        .expect("Failed to build application.");

    let address = format!("http://localhost:{}", application.port());
    let _ = actix_web::rt::spawn(async move {
        application
            .start()
            .await
            .expect("Expected application to start");
    });

    // Redirects are asserted on, not followed
    let client = Client::builder()
        .redirect(Policy::none())
        .build()
        .expect("Failed to build http client.");

    TestApp {
        address,
        config,
        knock,
        client,
    }
}
