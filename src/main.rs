use anyhow::Context;
use report_mailer::configuration::get_configuration;
use report_mailer::startup::build;
use report_mailer::telemetry::{get_subscriber, init_subscriber};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let subscriber = get_subscriber("report-mailer".into(), "info".into(), std::io::stdout);
    init_subscriber(subscriber);

    let config = get_configuration().context("Failed to read configuration.")?;
    let app = build(config)?;
    tracing::info!("Listening on port {}", app.port());
    app.run().await?;

    Ok(())
}
