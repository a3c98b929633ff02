//! src/report/mod.rs
use crate::configuration::ReportSettings;
use crate::telemetry::spawn_blocking_with_tracing;
use anyhow::Context;
use std::path::PathBuf;

mod extract;
mod tone;

const RULE: &str = "--------------------------------------------------";

#[derive(thiserror::Error, Debug)]
pub enum ReportError {
    #[error("Report file not found")]
    NotFound(PathBuf),
    #[error("Failed to read the report file")]
    Read(#[source] std::io::Error),
    #[error("Failed to extract report content")]
    Empty,
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

#[derive(Debug)]
pub struct Report {
    pub subject: String,
    pub body: String,
}

/// The pre-generated HTML report on disk.
///
/// It is re-read on every load so a regenerated report goes out without a restart.
#[derive(Debug, Clone)]
pub struct ReportSource {
    path: PathBuf,
    subject: String,
}

impl From<ReportSettings> for ReportSource {
    fn from(settings: ReportSettings) -> Self {
        Self {
            path: settings.path,
            subject: settings.subject,
        }
    }
}

impl ReportSource {
    #[tracing::instrument(name = "Loading the report", skip(self), fields(path = %self.path.display()))]
    pub async fn load(&self) -> Result<Report, ReportError> {
        let html = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => ReportError::NotFound(self.path.clone()),
                _ => ReportError::Read(e),
            })?;

        let text = spawn_blocking_with_tracing(move || {
            let extracted = extract::html_to_text(&html);
            if extracted.trim().is_empty() {
                return None;
            }
            Some(tone::professional(&extracted))
        })
        .await
        .context("Failed to spawn blocking task")?
        .ok_or(ReportError::Empty)?;

        let prepared_on = chrono::Local::now().format("%B %-d, %Y").to_string();
        Ok(Report {
            subject: self.subject.clone(),
            body: compose_body(&text, &prepared_on),
        })
    }
}

fn compose_body(report: &str, prepared_on: &str) -> String {
    format!(
        r#"BITCOIN MARKET ANALYSIS REPORT
{RULE}
Prepared {prepared_on}

Dear Valued Client,

Please find below our comprehensive Bitcoin market analysis and trading recommendations based on recent market data and sentiment analysis.

{report}

{RULE}

TRADING RECOMMENDATION SUMMARY

Based on our analysis of current market conditions, technical indicators, and fundamental factors, we provide the following actionable insights for your consideration.

Please note: This analysis is for informational purposes only and should not be considered as financial advice. Always conduct your own due diligence and consult with a qualified financial advisor before making trading decisions.

Best regards,
Bitcoin Analysis System

---
This report was generated automatically based on real-time market data and sentiment analysis.
"#
    )
}
