//! Menu handler implementation.

use thiserror::Error;
use tracing::{debug, info};

use super::action::Action;
use super::screens;
use super::surface::{ChatSurface, SurfaceError};
use crate::shop::{mask_number, simulate_purchase, simulate_recharge, PurchaseOutcome};
use crate::storage::{AccountStore, StorageError};

/// Notice shown while a purchase is simulated.
const PURCHASE_NOTICE: &str = "🔄 Processing purchase...";

/// Notice shown while a recharge is simulated.
const RECHARGE_NOTICE: &str = "💳 Processing payment...";

/// Errors from a single handler invocation.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("Storage failure: {0}")]
    Storage(#[from] StorageError),

    #[error("Chat failure: {0}")]
    Surface(#[from] SurfaceError),
}

/// The user behind an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRef {
    pub id: u64,
    pub username: Option<String>,
    pub first_name: String,
}

/// Routes actions to menus and simulators.
#[derive(Debug, Clone)]
pub struct MenuHandler {
    /// Account storage.
    store: AccountStore,

    /// User allowed to see the admin panel.
    admin_id: Option<u64>,
}

impl MenuHandler {
    /// Creates a new menu handler.
    #[must_use]
    pub fn new(store: AccountStore, admin_id: Option<u64>) -> Self {
        Self { store, admin_id }
    }

    /// Whether `user_id` is the configured admin.
    #[must_use]
    pub fn is_admin(&self, user_id: u64) -> bool {
        self.admin_id == Some(user_id)
    }

    /// Handles `/start`: registers the user and shows the main menu.
    pub async fn start<S: ChatSurface>(&self, user: &UserRef, surface: &S) -> Result<(), HandlerError> {
        self.handle_main_menu(user, surface).await
    }

    /// Handles `/help`.
    pub async fn help<S: ChatSurface>(&self, surface: &S) -> Result<(), HandlerError> {
        surface.acknowledge(None).await?;
        surface.render(&screens::help_menu()).await?;
        Ok(())
    }

    /// Routes a button press.
    ///
    /// Returns `false` without touching the surface or the store when `data`
    /// is not a recognized action.
    pub async fn dispatch<S: ChatSurface>(
        &self,
        user: &UserRef,
        data: &str,
        surface: &S,
    ) -> Result<bool, HandlerError> {
        let Some(action) = Action::parse(data) else {
            debug!("Ignoring unrecognized action {:?} from user {}", data, user.id);
            return Ok(false);
        };

        if action == Action::AdminPanel && !self.is_admin(user.id) {
            debug!("Ignoring admin action from non-admin user {}", user.id);
            return Ok(false);
        }

        debug!("Handling {} for user {}", action, user.id);
        match action {
            Action::MainMenu => self.handle_main_menu(user, surface).await?,
            Action::ServicesMenu => show(surface, screens::services_menu()).await?,
            Action::RechargeMenu => show(surface, screens::recharge_menu()).await?,
            Action::HelpMenu => show(surface, screens::help_menu()).await?,
            Action::AdminPanel => self.handle_admin_panel(surface).await?,
            Action::Purchase(key) => self.handle_purchase(user, &key, surface).await?,
            Action::Recharge(amount) => handle_recharge(user, amount, surface).await?,
        }
        Ok(true)
    }

    async fn handle_main_menu<S: ChatSurface>(&self, user: &UserRef, surface: &S) -> Result<(), HandlerError> {
        surface.acknowledge(None).await?;

        self.store
            .ensure_account(user.id, user.username.as_deref(), Some(&user.first_name))?;
        let balance = self.store.get_balance(user.id)?;
        let bonus = self.store.get_bonus_balance(user.id)?;

        let screen = screens::main_menu(&user.first_name, balance, bonus, self.is_admin(user.id));
        surface.render(&screen).await?;
        Ok(())
    }

    async fn handle_admin_panel<S: ChatSurface>(&self, surface: &S) -> Result<(), HandlerError> {
        surface.acknowledge(None).await?;
        let stats = self.store.stats()?;
        surface.render(&screens::admin_panel(&stats)).await?;
        Ok(())
    }

    async fn handle_purchase<S: ChatSurface>(
        &self,
        user: &UserRef,
        key: &str,
        surface: &S,
    ) -> Result<(), HandlerError> {
        surface.acknowledge(Some(PURCHASE_NOTICE)).await?;

        let balance = self.store.get_balance(user.id)?;
        let outcome = simulate_purchase(key, balance, &mut rand::thread_rng());

        match &outcome {
            PurchaseOutcome::InsufficientFunds { deficit, .. } => {
                info!(
                    "User {} short by {:.2} for {}",
                    user.id,
                    deficit,
                    outcome.service()
                );
            }
            PurchaseOutcome::Issued { number, .. } => {
                info!(
                    "Issued placeholder number {} for {} to user {}",
                    mask_number(number),
                    outcome.service(),
                    user.id
                );
            }
        }

        surface.render(&screens::purchase_result(&outcome)).await?;
        Ok(())
    }
}

async fn show<S: ChatSurface>(surface: &S, screen: screens::Screen) -> Result<(), HandlerError> {
    surface.acknowledge(None).await?;
    surface.render(&screen).await?;
    Ok(())
}

async fn handle_recharge<S: ChatSurface>(user: &UserRef, amount: f64, surface: &S) -> Result<(), HandlerError> {
    surface.acknowledge(Some(RECHARGE_NOTICE)).await?;

    let pending = simulate_recharge(amount);
    info!("User {} requested a recharge of {:.2}", user.id, pending.amount);

    surface.render(&screens::recharge_pending(&pending)).await?;
    Ok(())
}
