//! Menu and dispatch layer.
//!
//! Parses action identifiers from inline buttons, routes them to the menu
//! handlers and simulators, and renders the resulting screens onto a
//! [`ChatSurface`].

mod action;
mod handler;
pub mod screens;
mod surface;

pub use action::{Action, ADMIN_PANEL, HELP_MENU, MAIN_MENU, RECHARGE_MENU, SERVICES_MENU};
pub use handler::{HandlerError, MenuHandler, UserRef};
pub use screens::{Button, Screen};
pub use surface::{ChatSurface, SurfaceError};

#[cfg(test)]
pub use surface::recording;
