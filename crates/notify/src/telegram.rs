use async_trait::async_trait;
use teloxide::prelude::*;
use tracing::info;

use common::{Error, Notifier, Result, TradingSignal};

use crate::message::signal_message;

/// Sends the signal text to one chat through the Bot API.
pub struct TelegramNotifier {
    bot: Bot,
    chat_id: ChatId,
}

impl TelegramNotifier {
    pub fn new(token: impl Into<String>, chat_id: i64) -> Self {
        Self::with_bot(Bot::new(token), chat_id)
    }

    /// Share an existing bot with the command dispatcher.
    pub fn with_bot(bot: Bot, chat_id: i64) -> Self {
        Self {
            bot,
            chat_id: ChatId(chat_id),
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn deliver(&self, signal: &TradingSignal) -> Result<()> {
        self.bot
            .send_message(self.chat_id, signal_message(signal))
            .await
            .map_err(|e| Error::notification("telegram", e))?;
        info!(chat_id = self.chat_id.0, "Signal sent to Telegram");
        Ok(())
    }
}
