//! Purchase and recharge simulators.
//!
//! Prices, placeholder numbers and pending payments. Nothing here touches
//! stored balances.

pub mod catalog;
mod purchase;
mod recharge;

pub use catalog::{Service, DEFAULT_PRICE, RECHARGE_AMOUNTS, SERVICES};
pub use purchase::{mask_number, placeholder_number, simulate_purchase, PurchaseOutcome};
pub use recharge::{simulate_recharge, PendingRecharge};
