use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use tracing::info;

use common::format::usd;
use common::{Error, Notifier, Result, SignalType, TradingSignal};

use crate::{http_client, message::signal_message};

const GREEN: u32 = 0x00FF00;
const RED: u32 = 0xFF0000;

pub struct DiscordNotifier {
    url: String,
    http: Client,
}

impl DiscordNotifier {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            http: http_client(),
        }
    }
}

/// Message body plus one embed summarising the setup.
pub fn discord_payload(signal: &TradingSignal) -> Value {
    let color = if signal.signal_type == SignalType::Long {
        GREEN
    } else {
        RED
    };
    let field = |name: &str, value: String| json!({ "name": name, "value": value, "inline": true });

    json!({
        "content": signal_message(signal),
        "embeds": [{
            "title": format!("{} {}", signal.signal_type, signal.symbol),
            "color": color,
            "fields": [
                field("Entry", format!("{} - {}", usd(signal.entry_zone.min, 2), usd(signal.entry_zone.max, 2))),
                field("Stop Loss", usd(signal.stop_loss, 2)),
                field("TP1", usd(signal.take_profits.tp1, 2)),
                field("Confidence", format!("{:.0}%", signal.confidence_score)),
                field("Pattern", signal.pattern.to_string()),
                field("R:R", format!("{:.2}", signal.risk_reward_ratio)),
            ],
        }],
    })
}

#[async_trait]
impl Notifier for DiscordNotifier {
    fn name(&self) -> &str {
        "discord"
    }

    async fn deliver(&self, signal: &TradingSignal) -> Result<()> {
        let resp = self
            .http
            .post(&self.url)
            .json(&discord_payload(signal))
            .send()
            .await
            .map_err(|e| Error::notification("discord", e))?;

        // Discord answers 204 unless `?wait=true` is set
        match resp.status() {
            StatusCode::OK | StatusCode::NO_CONTENT => {
                info!("Signal posted to Discord");
                Ok(())
            }
            status => Err(Error::notification("discord", format!("HTTP {status}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::tests::sample_signal;

    #[test]
    fn long_embed_is_green() {
        let payload = discord_payload(&sample_signal());
        let embed = &payload["embeds"][0];
        assert_eq!(embed["title"], "LONG BTCUSDT");
        assert_eq!(embed["color"], 65280);
        assert_eq!(embed["fields"][0]["value"], "$94,200.00 - $94,500.00");
        assert_eq!(embed["fields"][5]["value"], "1.07");
    }

    #[test]
    fn short_embed_is_red() {
        let mut signal = sample_signal();
        signal.signal_type = SignalType::Short;
        assert_eq!(discord_payload(&signal)["embeds"][0]["color"], 16711680);
    }

    #[tokio::test]
    async fn no_content_counts_as_delivered() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/webhooks/1/abc")
            .with_status(204)
            .create_async()
            .await;

        let notifier = DiscordNotifier::new(format!("{}/api/webhooks/1/abc", server.url()));
        notifier.deliver(&sample_signal()).await.unwrap();
        mock.assert_async().await;
    }
}
