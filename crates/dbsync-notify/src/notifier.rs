use anyhow::{Context, Result};

use crate::report::RunReport;

/// Collaborator boundary for delivering a finished run's report (spec.md
/// §7: "via the notification collaborator, an emailed report" — mail
/// transport itself is out of scope, this is the seam a real transport
/// would sit behind).
pub trait Notifier {
    fn notify(&self, report: &RunReport) -> Result<()>;
}

/// Default notifier: discards the report. Used when no webhook URL is
/// configured.
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _report: &RunReport) -> Result<()> {
        Ok(())
    }
}

/// Posts the report as JSON to a configured URL.
pub struct WebhookNotifier {
    url: String,
    client: reqwest::blocking::Client,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>) -> Self {
        WebhookNotifier {
            url: url.into(),
            client: reqwest::blocking::Client::new(),
        }
    }
}

impl Notifier for WebhookNotifier {
    fn notify(&self, report: &RunReport) -> Result<()> {
        let response = self
            .client
            .post(&self.url)
            .json(report)
            .send()
            .with_context(|| format!("posting run report to `{}`", self.url))?;

        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), url = %self.url, "webhook notifier got a non-success response");
        }

        Ok(())
    }
}
