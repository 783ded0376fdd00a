//! The chat capabilities menu handlers need.

use std::future::Future;

use thiserror::Error;

use super::screens::Screen;

/// Failure to talk to the chat platform.
#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("Telegram request failed: {0}")]
    Request(#[from] teloxide::RequestError),

    #[error("The originating message is no longer available")]
    MessageUnavailable,
}

/// Where a handler renders its screen.
///
/// For a command this is a new message in the chat; for a button press it is
/// the message carrying the button.
pub trait ChatSurface: Send + Sync {
    /// Confirms receipt of the event, optionally with a short notice.
    fn acknowledge(&self, notice: Option<&str>)
    -> impl Future<Output = Result<(), SurfaceError>> + Send;

    /// Shows `screen`, replacing the calling message where possible.
    fn render(&self, screen: &Screen) -> impl Future<Output = Result<(), SurfaceError>> + Send;

    /// Shows a transient warning.
    fn warn(&self, text: &str) -> impl Future<Output = Result<(), SurfaceError>> + Send;
}

/// Surface that records calls, for handler tests.
#[cfg(test)]
pub mod recording {
    use std::sync::Mutex;

    use super::{ChatSurface, Screen, SurfaceError};

    /// One recorded call.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Event {
        Ack(Option<String>),
        Render(Screen),
        Warn(String),
    }

    #[derive(Debug, Default)]
    pub struct RecordingSurface {
        events: Mutex<Vec<Event>>,
    }

    impl RecordingSurface {
        pub fn events(&self) -> Vec<Event> {
            self.events.lock().unwrap().clone()
        }

        /// The last rendered screen, if any.
        pub fn last_screen(&self) -> Option<Screen> {
            self.events().into_iter().rev().find_map(|e| match e {
                Event::Render(screen) => Some(screen),
                _ => None,
            })
        }

        fn push(&self, event: Event) {
            self.events.lock().unwrap().push(event);
        }
    }

    impl ChatSurface for RecordingSurface {
        async fn acknowledge(&self, notice: Option<&str>) -> Result<(), SurfaceError> {
            self.push(Event::Ack(notice.map(str::to_owned)));
            Ok(())
        }

        async fn render(&self, screen: &Screen) -> Result<(), SurfaceError> {
            self.push(Event::Render(screen.clone()));
            Ok(())
        }

        async fn warn(&self, text: &str) -> Result<(), SurfaceError> {
            self.push(Event::Warn(text.to_owned()));
            Ok(())
        }
    }
}
