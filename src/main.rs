mod telemetry;

use alertdeck_api::Application;
use alertdeck_infra::setup_context;
use telemetry::{get_subscriber, init_subscriber};
use tracing::info;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    openssl_probe::init_ssl_cert_env_vars();
    // Before the subscriber so that RUST_LOG can come from .env as well
    let dotenv = dotenvy::dotenv();

    let subscriber = get_subscriber("alertdeck_server".into(), "info".into());
    init_subscriber(subscriber);

    if let Ok(path) = dotenv {
        info!("Loaded environment from {}", path.display());
    }

    let context = setup_context()?;

    let app = Application::new(context).await?;
    info!("Alert dashboard listening on port {}", app.port());
    app.start().await?;
    Ok(())
}
