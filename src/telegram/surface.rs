//! Telegram implementation of [`ChatSurface`].

use teloxide::prelude::*;
use teloxide::types::{
    CallbackQuery, ChatId, InlineKeyboardButton, InlineKeyboardMarkup, MessageId, ParseMode,
};
use tracing::debug;

use crate::menu::{ChatSurface, Screen, SurfaceError};

/// What triggered the handler.
#[derive(Debug, Clone)]
enum Origin {
    /// A command message; screens are sent as new messages.
    Command { chat_id: ChatId },

    /// A button press; screens replace the message carrying the button.
    Callback {
        query_id: String,
        message: Option<(ChatId, MessageId)>,
    },
}

/// Renders screens into a Telegram chat.
#[derive(Debug, Clone)]
pub struct TelegramSurface {
    bot: Bot,
    origin: Origin,
}

impl TelegramSurface {
    /// Surface for a command sent in `chat_id`.
    #[must_use]
    pub fn for_command(bot: Bot, chat_id: ChatId) -> Self {
        Self {
            bot,
            origin: Origin::Command { chat_id },
        }
    }

    /// Surface for a pressed inline button.
    #[must_use]
    pub fn for_callback(bot: Bot, query: &CallbackQuery) -> Self {
        let message = query.message.as_ref().map(|m| (m.chat().id, m.id()));
        Self {
            bot,
            origin: Origin::Callback {
                query_id: query.id.clone(),
                message,
            },
        }
    }
}

impl ChatSurface for TelegramSurface {
    async fn acknowledge(&self, notice: Option<&str>) -> Result<(), SurfaceError> {
        let Origin::Callback { query_id, .. } = &self.origin else {
            return Ok(());
        };

        let mut answer = self.bot.answer_callback_query(query_id.clone());
        if let Some(text) = notice {
            answer = answer.text(text);
        }
        answer.await?;
        Ok(())
    }

    async fn render(&self, screen: &Screen) -> Result<(), SurfaceError> {
        let markup = keyboard(screen);
        match &self.origin {
            Origin::Command { chat_id } => {
                self.bot
                    .send_message(*chat_id, screen.text.clone())
                    .parse_mode(ParseMode::Html)
                    .reply_markup(markup)
                    .await?;
            }
            Origin::Callback { message, .. } => {
                let (chat_id, message_id) = message.ok_or(SurfaceError::MessageUnavailable)?;
                match self
                    .bot
                    .edit_message_text(chat_id, message_id, screen.text.clone())
                    .parse_mode(ParseMode::Html)
                    .reply_markup(markup)
                    .await
                {
                    Ok(_) => {}
                    Err(e) if is_not_modified(&e) => {
                        debug!("Message {} already shows this screen", message_id);
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        }
        Ok(())
    }

    async fn warn(&self, text: &str) -> Result<(), SurfaceError> {
        match &self.origin {
            Origin::Command { chat_id } => {
                self.bot.send_message(*chat_id, text).await?;
            }
            Origin::Callback { query_id, .. } => {
                self.bot
                    .answer_callback_query(query_id.clone())
                    .text(text)
                    .show_alert(false)
                    .await?;
            }
        }
        Ok(())
    }
}

/// Converts screen rows into an inline keyboard.
fn keyboard(screen: &Screen) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(screen.rows.iter().map(|row| {
        row.iter()
            .map(|b| InlineKeyboardButton::callback(b.label.clone(), b.action.clone()))
            .collect::<Vec<_>>()
    }))
}

/// Telegram rejects edits that would not change the message.
fn is_not_modified(err: &teloxide::RequestError) -> bool {
    matches!(
        err,
        teloxide::RequestError::Api(teloxide::ApiError::MessageNotModified)
    )
}
