//! Static price tables for numbers and recharges.

/// Price charged for a service missing from [`SERVICES`].
pub const DEFAULT_PRICE: f64 = 2.50;

/// Placeholder number prefix: Brazil country code plus Sao Paulo mobile area.
pub const NUMBER_PREFIX: &str = "+55119";

/// A service a number can be bought for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Service {
    /// Key used in `service_<key>` action identifiers.
    pub key: &'static str,
    /// Human readable name.
    pub name: &'static str,
    /// Button emoji.
    pub emoji: &'static str,
    /// Price in BRL.
    pub price: f64,
}

/// Services listed on the services menu, in display order.
pub const SERVICES: &[Service] = &[
    Service { key: "whatsapp", name: "WhatsApp", emoji: "📱", price: 2.50 },
    Service { key: "telegram", name: "Telegram", emoji: "📨", price: 3.00 },
    Service { key: "instagram", name: "Instagram", emoji: "📸", price: 4.00 },
    Service { key: "facebook", name: "Facebook", emoji: "👥", price: 3.50 },
    Service { key: "google", name: "Google", emoji: "🔍", price: 2.80 },
    Service { key: "twitter", name: "Twitter", emoji: "🐦", price: 4.50 },
];

/// Top-up amounts offered on the recharge menu, in BRL.
pub const RECHARGE_AMOUNTS: &[u32] = &[10, 25, 50, 100];

/// Recharge bonus tiers as `(minimum amount, bonus percent)`, highest first.
pub const BONUS_TIERS: &[(f64, u32)] = &[(100.0, 20), (50.0, 15)];

/// Looks up a service by key.
#[must_use]
pub fn find_service(key: &str) -> Option<&'static Service> {
    SERVICES.iter().find(|s| s.key == key)
}

/// Price for `key`, falling back to [`DEFAULT_PRICE`] for unknown services.
#[must_use]
pub fn price_for(key: &str) -> f64 {
    find_service(key).map_or(DEFAULT_PRICE, |s| s.price)
}

/// Bonus percent a recharge of `amount` qualifies for.
#[must_use]
pub fn bonus_percent(amount: f64) -> u32 {
    BONUS_TIERS
        .iter()
        .find(|(min, _)| amount >= *min)
        .map_or(0, |&(_, percent)| percent)
}
