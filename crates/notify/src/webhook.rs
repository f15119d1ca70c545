use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::info;

use common::{Error, Notifier, Result, TradingSignal};

use crate::http_client;

/// POSTs the signal as flat JSON. Used for both the generic webhook and n8n;
/// only an HTTP 200 counts as delivered.
pub struct WebhookNotifier {
    name: String,
    url: String,
    http: Client,
}

impl WebhookNotifier {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            http: http_client(),
        }
    }

    pub fn generic(url: impl Into<String>) -> Self {
        Self::new("webhook", url)
    }

    pub fn n8n(url: impl Into<String>) -> Self {
        Self::new("n8n", url)
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    fn name(&self) -> &str {
        &self.name
    }

    async fn deliver(&self, signal: &TradingSignal) -> Result<()> {
        let resp = self
            .http
            .post(&self.url)
            .json(signal)
            .send()
            .await
            .map_err(|e| Error::notification(&self.name, e))?;

        let status = resp.status();
        if status != StatusCode::OK {
            return Err(Error::notification(&self.name, format!("HTTP {status}")));
        }
        info!(channel = %self.name, "Signal posted to webhook");
        Ok(())
    }
}
