//! Update dispatching: rate limit gate, commands and button presses.

use std::sync::Arc;

use teloxide::dispatching::{HandlerExt, UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::{CallbackQuery, UpdateKind, User};
use teloxide::utils::command::BotCommands;
use tracing::{debug, error, info};

use super::{RateLimiter, TelegramSurface};
use crate::menu::{HandlerError, MenuHandler, UserRef};

/// Slash commands understood by the bot.
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "open the main menu")]
    Start,

    #[command(description = "show how the bot works")]
    Help,
}

/// Shared state injected into every handler.
#[derive(Debug)]
pub struct AppState {
    /// Menu routing and rendering.
    pub handler: MenuHandler,

    /// Per-user throttle applied before any handler runs.
    pub limiter: RateLimiter,
}

impl AppState {
    /// Bundles the handler and the limiter.
    #[must_use]
    pub fn new(handler: MenuHandler, limiter: RateLimiter) -> Self {
        Self { handler, limiter }
    }
}

/// Builds the update handler tree.
///
/// Commands and button presses both pass the rate limit gate first;
/// everything else falls through to the default handler.
#[must_use]
pub fn schema() -> UpdateHandler<HandlerError> {
    let commands = Update::filter_message()
        .filter_command::<Command>()
        .filter_async(rate_limit_gate)
        .endpoint(on_command);

    let callbacks = Update::filter_callback_query()
        .filter_async(rate_limit_gate)
        .endpoint(on_callback);

    dptree::entry().branch(commands).branch(callbacks)
}

/// Connects to Telegram and processes updates until Ctrl+C.
///
/// # Errors
///
/// Returns an error if the startup requests to Telegram fail. Errors from
/// individual handlers are logged and never returned.
pub async fn run(bot: Bot, state: Arc<AppState>) -> Result<(), teloxide::RequestError> {
    bot.delete_webhook().drop_pending_updates(true).await?;
    bot.set_my_commands(Command::bot_commands()).await?;

    let me = bot.get_me().await?;
    info!("Logged in as @{}", me.username());

    Dispatcher::builder(bot, schema())
        .dependencies(dptree::deps![state])
        .default_handler(|_update| async move {
            debug!("Ignoring unhandled update");
        })
        .error_handler(Arc::new(|err: HandlerError| async move {
            error!("Error while handling update: {}", err);
        }))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    info!("Dispatcher stopped");
    Ok(())
}

/// Rate limit middleware shared by every branch.
async fn rate_limit_gate(bot: Bot, update: Update, state: Arc<AppState>) -> bool {
    let Some(user) = update.from() else {
        return false;
    };
    let surface = match &update.kind {
        UpdateKind::Message(msg) => TelegramSurface::for_command(bot, msg.chat.id),
        UpdateKind::CallbackQuery(query) => TelegramSurface::for_callback(bot, query),
        _ => return false,
    };
    state.limiter.admit(user.id.0, &surface).await
}

async fn on_command(
    bot: Bot,
    update: Update,
    msg: Message,
    cmd: Command,
    state: Arc<AppState>,
) -> Result<(), HandlerError> {
    let Some(user) = update.from().map(user_ref) else {
        return Ok(());
    };
    let surface = TelegramSurface::for_command(bot, msg.chat.id);

    debug!("Command {:?} from user {}", cmd, user.id);
    match cmd {
        Command::Start => state.handler.start(&user, &surface).await,
        Command::Help => state.handler.help(&surface).await,
    }
}

async fn on_callback(bot: Bot, query: CallbackQuery, state: Arc<AppState>) -> Result<(), HandlerError> {
    let Some(data) = query.data.as_deref() else {
        return Ok(());
    };
    let user = user_ref(&query.from);
    let surface = TelegramSurface::for_callback(bot, &query);

    state.handler.dispatch(&user, data, &surface).await?;
    Ok(())
}

fn user_ref(user: &User) -> UserRef {
    UserRef {
        id: user.id.0,
        username: user.username.clone(),
        first_name: user.first_name.clone(),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::{Value, json};
    use teloxide::types::Me;

    use super::*;
    use crate::storage::AccountStore;

    fn state_with(limiter: RateLimiter) -> Arc<AppState> {
        let store = AccountStore::open_in_memory().unwrap();
        Arc::new(AppState::new(MenuHandler::new(store, None), limiter))
    }

    fn me() -> Me {
        serde_json::from_value(json!({
            "id": 1,
            "is_bot": true,
            "first_name": "Shop",
            "username": "shop_bot",
            "can_join_groups": false,
            "can_read_all_group_messages": false,
            "supports_inline_queries": false,
            "can_connect_to_business": false
        }))
        .unwrap()
    }

    fn user(id: u64) -> Value {
        json!({ "id": id, "is_bot": false, "first_name": "Ana" })
    }

    fn message(user_id: u64, from: Value, text: &str) -> Value {
        let mut message = json!({
            "message_id": 10,
            "date": 1_700_000_000,
            "chat": { "id": user_id, "type": "private", "first_name": "Ana" },
            "from": from,
            "text": text
        });
        if text.starts_with('/') {
            message["entities"] = json!([{ "type": "bot_command", "offset": 0, "length": text.len() }]);
        }
        message
    }

    fn text_update(user_id: u64, text: &str) -> Update {
        serde_json::from_value(json!({
            "update_id": 1,
            "message": message(user_id, user(user_id), text)
        }))
        .unwrap()
    }

    fn button_update(user_id: u64, data: &str) -> Update {
        serde_json::from_value(json!({
            "update_id": 2,
            "callback_query": {
                "id": "cb-1",
                "from": user(user_id),
                "chat_instance": "ci",
                "data": data,
                "message": message(user_id, json!({ "id": 1, "is_bot": true, "first_name": "Shop" }), "menu")
            }
        }))
        .unwrap()
    }

    async fn passes_through(state: &Arc<AppState>, update: Update) -> bool {
        let deps = dptree::deps![Bot::new("0:offline"), me(), update, Arc::clone(state)];
        schema().dispatch(deps).await.is_continue()
    }

    async fn throttled_state(user_id: u64) -> Arc<AppState> {
        let state = state_with(RateLimiter::new(Duration::from_secs(3600), 20));
        state.limiter.check(user_id).await;
        state
    }

    #[tokio::test]
    async fn test_throttled_command_never_reaches_handler() {
        let state = throttled_state(42).await;
        assert!(passes_through(&state, text_update(42, "/start")).await);
        assert_eq!(state.limiter.recorded(42).await, 1);
    }

    #[tokio::test]
    async fn test_throttled_button_never_reaches_handler() {
        let state = throttled_state(42).await;
        assert!(passes_through(&state, button_update(42, "menu_main")).await);
        assert_eq!(state.limiter.recorded(42).await, 1);
    }

    #[tokio::test]
    async fn test_plain_text_skips_limiter() {
        let state = state_with(RateLimiter::from_settings(&crate::config::RateLimitSettings::default()));
        assert!(passes_through(&state, text_update(43, "hello")).await);
        assert!(passes_through(&state, text_update(43, "/buy")).await);
        assert_eq!(state.limiter.recorded(43).await, 0);
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("/start", "shop_bot").ok(), Some(Command::Start));
        assert_eq!(Command::parse("/help", "shop_bot").ok(), Some(Command::Help));
        assert_eq!(
            Command::parse("/start@shop_bot", "shop_bot").ok(),
            Some(Command::Start)
        );
        assert!(Command::parse("/buy", "shop_bot").is_err());
    }
}
