//! Delivery channels for fired signals and the fan-out that drives them.

pub mod discord;
pub mod fanout;
pub mod message;
pub mod telegram;
pub mod webhook;

pub use discord::DiscordNotifier;
pub use fanout::NotifierSet;
pub use message::signal_message;
pub use telegram::TelegramNotifier;
pub use webhook::WebhookNotifier;

/// Shared HTTP client for the webhook-style notifiers.
pub(crate) fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .use_rustls_tls()
        .timeout(std::time::Duration::from_secs(10))
        .build()
        .expect("Failed to build HTTP client")
}
