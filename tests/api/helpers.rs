//! tests/api/helpers.rs

use once_cell::sync::Lazy;
use report_mailer::configuration::get_file_configuration;
use report_mailer::domain::RecipientEmail;
use report_mailer::email::{DeliveryError, EmailSender};
use report_mailer::startup::build_with_sender;
use report_mailer::telemetry::{get_subscriber, init_subscriber};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

static TRACING: Lazy<()> = Lazy::new(|| {
    let default_filter_level = "info".to_string();
    let subscriber_name = "test".to_string();

    // Set TEST_LOG=true to see logs during tests
    // Use bunyan to format the logs nicely:
    // $ TEST_LOG=true cargo test| bunyan
    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::stdout);
        init_subscriber(subscriber);
    } else {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::sink);
        init_subscriber(subscriber);
    };
});

pub const REPORT_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Bitcoin Analysis</title>
    <style>body { background: #1e1e23; }</style>
</head>
<body>
    <div id="report-date"></div>
    <h1>Vibe check 🚀</h1>
    <p>Bitcoin held above support this week, no cap.</p>
    <p>Recommendation: HOLD</p>
    <script>document.getElementById('report-date').textContent = new Date();</script>
</body>
</html>"#;

#[derive(Debug, Clone)]
pub struct SentEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Stands in for the SMTP relay, recording every delivery attempt.
#[derive(Clone, Default)]
pub struct FakeRelay {
    attempts: Arc<Mutex<Vec<SentEmail>>>,
    failing: Arc<AtomicBool>,
}

impl FakeRelay {
    /// Refuse every following delivery the way a relay refuses bad credentials.
    pub fn reject_credentials(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    pub fn attempts(&self) -> Vec<SentEmail> {
        self.attempts.lock().unwrap().clone()
    }
}

impl EmailSender for FakeRelay {
    async fn send(
        &self,
        to: &RecipientEmail,
        subject: &str,
        body: &str,
    ) -> Result<(), DeliveryError> {
        self.attempts.lock().unwrap().push(SentEmail {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });

        if self.failing.load(Ordering::SeqCst) {
            return Err(anyhow::anyhow!("535 5.7.8 Username and Password not accepted").into());
        }
        Ok(())
    }
}

pub struct Test {
    pub address: String,
    pub relay: FakeRelay,
    pub report_path: PathBuf,
}

impl Test {
    pub async fn get(&self, path: &str) -> reqwest::Response {
        reqwest::get(&format!("{}{}", self.address, path))
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_send_report(&self, body: serde_json::Value) -> reqwest::Response {
        reqwest::Client::new()
            .post(&format!("{}/send-report", self.address))
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_raw(&self, path: &str, body: String) -> reqwest::Response {
        reqwest::Client::new()
            .post(&format!("{}{}", self.address, path))
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }
}

pub async fn setup() -> Test {
    Lazy::force(&TRACING);

    let mut config = get_file_configuration().expect("Failed to read configuration.");
    config.application.host = "127.0.0.1".into();
    config.application.port = 0;

    // Every test gets its own report file
    config.report.path = std::env::temp_dir().join(format!("report-{}.html", Uuid::new_v4()));
    std::fs::write(&config.report.path, REPORT_HTML).expect("Failed to write the report file.");

    let relay = FakeRelay::default();

    // Launch the server
    let app = build_with_sender(config.clone(), relay.clone()).expect("Failed to build server.");
    let address = format!("http://127.0.0.1:{}", app.port());

    tracing::info!("Test running with the following Settings:\n{:#?}", config);

    // Launch the server as a background task
    let _ = tokio::spawn(app.run());

    Test {
        address,
        relay,
        report_path: config.report.path,
    }
}
