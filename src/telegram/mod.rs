//! Telegram front end.
//!
//! Wires the menu layer into teloxide: the update handler tree, the rate
//! limiting middleware and the chat surface used to render screens.

mod bot;
mod rate_limiter;
mod surface;

pub use bot::{run, schema, AppState, Command};
pub use rate_limiter::{RateDecision, RateLimiter, FLOOD_WARNING};
pub use surface::TelegramSurface;
