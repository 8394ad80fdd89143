use todo_service::{telemetry, Application, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load()?;
    telemetry::init_tracing(&config.log_level);

    tracing::info!("Starting todo service");
    let application = Application::build(config).await?;
    application.run_until_stopped().await?;

    Ok(())
}
