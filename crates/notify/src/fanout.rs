use std::sync::Arc;

use futures_util::future::join_all;
use tracing::{error, info, warn};

use common::{Config, Notifier, TradingSignal};

use crate::{DiscordNotifier, TelegramNotifier, WebhookNotifier};

/// Every configured channel, delivered to concurrently.
#[derive(Clone, Default)]
pub struct NotifierSet {
    notifiers: Vec<Arc<dyn Notifier>>,
}

impl NotifierSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// One notifier per configured sink. Telegram needs both token and chat id.
    pub fn from_config(config: &Config) -> Self {
        let sinks = &config.notifications;
        let mut set = Self::new();

        if let Some(url) = &sinks.webhook_url {
            set.push(WebhookNotifier::generic(url.clone()));
        }
        if let (Some(token), Some(chat_id)) = (&sinks.telegram_token, sinks.telegram_chat_id) {
            set.push(TelegramNotifier::new(token.clone(), chat_id));
        }
        if let Some(url) = &sinks.discord_webhook {
            set.push(DiscordNotifier::new(url.clone()));
        }
        if let Some(url) = &sinks.n8n_webhook {
            set.push(WebhookNotifier::n8n(url.clone()));
        }

        if set.is_empty() {
            warn!("No notification channels configured; signals will only be logged");
        }
        set
    }

    pub fn push<N: Notifier + 'static>(&mut self, notifier: N) {
        self.notifiers.push(Arc::new(notifier));
    }

    pub fn with(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifiers.push(notifier);
        self
    }

    pub fn len(&self) -> usize {
        self.notifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notifiers.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.notifiers.iter().map(|n| n.name()).collect()
    }

    /// Deliver to every channel and wait for all of them. Returns `true` when
    /// at least one channel accepted the signal; an empty set returns `false`.
    pub async fn deliver(&self, signal: &TradingSignal) -> bool {
        let results = join_all(self.notifiers.iter().map(|n| n.deliver(signal))).await;

        let mut delivered = 0usize;
        for (notifier, result) in self.notifiers.iter().zip(results) {
            match result {
                Ok(()) => delivered += 1,
                Err(e) => error!(channel = %notifier.name(), error = %e, "Signal delivery failed"),
            }
        }

        info!(
            delivered,
            channels = self.notifiers.len(),
            symbol = %signal.symbol,
            "Signal fan-out complete"
        );
        delivered > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::tests::sample_signal;
    use async_trait::async_trait;
    use common::{Error, Result};

    struct Fixed {
        name: &'static str,
        ok: bool,
    }

    #[async_trait]
    impl Notifier for Fixed {
        fn name(&self) -> &str {
            self.name
        }

        async fn deliver(&self, _signal: &TradingSignal) -> Result<()> {
            if self.ok {
                Ok(())
            } else {
                Err(Error::notification(self.name, "down"))
            }
        }
    }

    #[tokio::test]
    async fn empty_set_reports_failure() {
        assert!(!NotifierSet::new().deliver(&sample_signal()).await);
    }

    #[tokio::test]
    async fn any_success_is_enough() {
        let mut set = NotifierSet::new();
        set.push(Fixed { name: "a", ok: false });
        set.push(Fixed { name: "b", ok: true });
        assert!(set.deliver(&sample_signal()).await);
    }

    #[tokio::test]
    async fn all_failures_report_failure() {
        let mut set = NotifierSet::new();
        set.push(Fixed { name: "a", ok: false });
        set.push(Fixed { name: "b", ok: false });
        assert!(!set.deliver(&sample_signal()).await);
    }

    #[tokio::test]
    async fn unreachable_webhook_does_not_block_others() {
        let mut server = mockito::Server::new_async().await;
        let ok = server
            .mock("POST", "/ok")
            .with_status(200)
            .create_async()
            .await;
        let broken = server
            .mock("POST", "/broken")
            .with_status(500)
            .create_async()
            .await;

        let mut set = NotifierSet::new();
        set.push(WebhookNotifier::generic(format!("{}/broken", server.url())));
        set.push(WebhookNotifier::n8n(format!("{}/ok", server.url())));

        assert!(set.deliver(&sample_signal()).await);
        ok.assert_async().await;
        broken.assert_async().await;
    }

    #[test]
    fn builds_from_config() {
        let config = Config::from_lookup(|key| match key {
            "WEBHOOK_URL" => Some("http://localhost/hook".to_string()),
            "DISCORD_WEBHOOK" => Some("http://localhost/discord".to_string()),
            // token without chat id: telegram stays off
            "TELEGRAM_TOKEN" => Some("123:abc".to_string()),
            _ => None,
        });
        let set = NotifierSet::from_config(&config);
        assert_eq!(set.names(), vec!["webhook", "discord"]);
    }
}
