use payment_service::app::{serve, ServeError};
use payment_service::config::AppConfig;
use payment_service::observability::init_tracing;

#[tokio::main]
async fn main() -> Result<(), ServeError> {
    let config = AppConfig::load()?;

    init_tracing(
        config.log_format(),
        &config.server.log_level,
        config.logging.directory.as_deref(),
    );

    if let Err(e) = serve(config).await {
        tracing::error!(error = %e, "Payment service failed");
        return Err(e);
    }

    Ok(())
}
