//! Action identifiers carried by inline buttons.

use std::fmt;

/// Identifier of the main menu.
pub const MAIN_MENU: &str = "menu_main";
/// Identifier of the services menu.
pub const SERVICES_MENU: &str = "menu_services";
/// Identifier of the recharge menu.
pub const RECHARGE_MENU: &str = "menu_recharge";
/// Identifier of the help menu.
pub const HELP_MENU: &str = "menu_help";
/// Identifier of the admin panel.
pub const ADMIN_PANEL: &str = "admin_panel";

const SERVICE_PREFIX: &str = "service_";
const RECHARGE_PREFIX: &str = "recharge_";

/// A routed button press.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Show the main menu.
    MainMenu,

    /// List purchasable services.
    ServicesMenu,

    /// List recharge amounts.
    RechargeMenu,

    /// Show usage help.
    HelpMenu,

    /// Show aggregate account figures (admin only).
    AdminPanel,

    /// Buy a number for the given service key.
    Purchase(String),

    /// Recharge the given amount.
    Recharge(f64),
}

impl Action {
    /// Parses an action identifier.
    ///
    /// Returns `None` for anything unrecognized, including a `service_` with
    /// no key and a `recharge_` whose amount is not a positive finite number.
    #[must_use]
    pub fn parse(data: &str) -> Option<Self> {
        match data {
            MAIN_MENU => return Some(Self::MainMenu),
            SERVICES_MENU => return Some(Self::ServicesMenu),
            RECHARGE_MENU => return Some(Self::RechargeMenu),
            HELP_MENU => return Some(Self::HelpMenu),
            ADMIN_PANEL => return Some(Self::AdminPanel),
            _ => {}
        }

        if let Some(key) = data.strip_prefix(SERVICE_PREFIX) {
            return (!key.is_empty()).then(|| Self::Purchase(key.to_owned()));
        }

        if let Some(raw) = data.strip_prefix(RECHARGE_PREFIX) {
            return raw
                .parse::<f64>()
                .ok()
                .filter(|amount| amount.is_finite() && *amount > 0.0)
                .map(Self::Recharge);
        }

        None
    }

    /// Builds the identifier for buying a number for `key`.
    #[must_use]
    pub fn purchase_id(key: &str) -> String {
        format!("{SERVICE_PREFIX}{key}")
    }

    /// Builds the identifier for recharging `amount`.
    #[must_use]
    pub fn recharge_id(amount: u32) -> String {
        format!("{RECHARGE_PREFIX}{amount}")
    }

    /// Returns the handler name used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::MainMenu => "main_menu",
            Self::ServicesMenu => "services_menu",
            Self::RechargeMenu => "recharge_menu",
            Self::HelpMenu => "help_menu",
            Self::AdminPanel => "admin_panel",
            Self::Purchase(_) => "purchase",
            Self::Recharge(_) => "recharge",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Purchase(key) => write!(f, "purchase {key}"),
            Self::Recharge(amount) => write!(f, "recharge {amount:.2}"),
            _ => write!(f, "{}", self.name()),
        }
    }
}
