//! Simulated balance recharge.

use super::catalog::bonus_percent;

/// A pending manual payment. Nothing is credited until an operator confirms it.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingRecharge {
    /// Requested amount in BRL.
    pub amount: f64,
    /// Bonus percent the amount qualifies for.
    pub bonus_percent: u32,
    /// Bonus the user would receive on confirmation.
    pub bonus_amount: f64,
}

/// Builds the pending payment shown for a recharge request.
#[must_use]
pub fn simulate_recharge(amount: f64) -> PendingRecharge {
    let bonus_percent = bonus_percent(amount);
    PendingRecharge {
        amount,
        bonus_percent,
        bonus_amount: amount * f64::from(bonus_percent) / 100.0,
    }
}
