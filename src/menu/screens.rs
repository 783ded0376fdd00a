//! Rendered menus: HTML text plus inline keyboard rows.

use std::fmt::Write as _;

use teloxide::utils::html::escape;

use super::action::{ADMIN_PANEL, Action, HELP_MENU, MAIN_MENU, RECHARGE_MENU, SERVICES_MENU};
use crate::shop::{PendingRecharge, PurchaseOutcome, RECHARGE_AMOUNTS, SERVICES};
use crate::storage::AccountStats;

/// An inline button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    /// Label shown to the user.
    pub label: String,
    /// Action identifier sent back when pressed.
    pub action: String,
}

impl Button {
    /// Creates a button.
    #[must_use]
    pub fn new(label: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            action: action.into(),
        }
    }

    fn back(action: &str) -> Self {
        Self::new("🔙 Back", action)
    }
}

/// A message body with its keyboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screen {
    /// HTML formatted text.
    pub text: String,
    /// Keyboard rows, top to bottom.
    pub rows: Vec<Vec<Button>>,
}

impl Screen {
    /// All action identifiers on the keyboard, in order.
    pub fn actions(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().flatten().map(|b| b.action.as_str())
    }
}

/// Formats an amount as Brazilian reais.
#[must_use]
pub fn brl(amount: f64) -> String {
    format!("R$ {amount:.2}")
}

/// Main menu with the user's balances. Admins get an extra row.
#[must_use]
pub fn main_menu(first_name: &str, balance: f64, bonus: f64, is_admin: bool) -> Screen {
    let mut rows = vec![
        vec![
            Button::new("📱 BUY NUMBERS", SERVICES_MENU),
            Button::new("💳 RECHARGE", RECHARGE_MENU),
        ],
        vec![Button::new("❓ HELP", HELP_MENU)],
    ];
    if is_admin {
        rows.push(vec![Button::new("🛠️ ADMIN", ADMIN_PANEL)]);
    }

    let text = format!(
        "🤖 <b>SMS PREMIUM BOT</b>\n\n\
         👋 Hello, {}!\n\
         💰 Balance: {}\n\
         🎁 Bonus: {}\n\n\
         📱 <b>AVAILABLE NUMBERS:</b>\n\
         • WhatsApp, Telegram, Instagram\n\
         • Facebook, Google, Twitter\n\
         • And many more!\n\n\
         🔥 <b>PRICES FROM {}</b>\n\
         ⚡ Instant delivery\n\
         🎯 24h support",
        escape(first_name),
        brl(balance),
        brl(bonus),
        brl(lowest_price()),
    );

    Screen { text, rows }
}

fn lowest_price() -> f64 {
    SERVICES
        .iter()
        .map(|s| s.price)
        .fold(f64::INFINITY, f64::min)
}

/// Services menu, two buttons per row.
#[must_use]
pub fn services_menu() -> Screen {
    let mut rows: Vec<Vec<Button>> = SERVICES
        .chunks(2)
        .map(|pair| {
            pair.iter()
                .map(|s| {
                    Button::new(
                        format!("{} {} - {}", s.emoji, s.name, brl(s.price)),
                        Action::purchase_id(s.key),
                    )
                })
                .collect()
        })
        .collect();
    rows.push(vec![Button::back(MAIN_MENU)]);

    Screen {
        text: "📱 <b>AVAILABLE SMS NUMBERS</b>\n\n\
               🔥 <b>MOST POPULAR:</b>\n\
               • WhatsApp - Guaranteed delivery\n\
               • Telegram - High success rate\n\
               • Instagram - Fast verification\n\n\
               💡 Choose a service:"
            .to_owned(),
        rows,
    }
}

/// Recharge menu, two amounts per row.
#[must_use]
pub fn recharge_menu() -> Screen {
    let mut rows: Vec<Vec<Button>> = RECHARGE_AMOUNTS
        .chunks(2)
        .map(|pair| {
            pair.iter()
                .map(|&amount| {
                    Button::new(
                        format!("💰 {}", brl(f64::from(amount))),
                        Action::recharge_id(amount),
                    )
                })
                .collect()
        })
        .collect();
    rows.push(vec![Button::back(MAIN_MENU)]);

    Screen {
        text: "💳 <b>RECHARGE BALANCE</b>\n\n\
               🎁 <b>RECHARGE BONUS:</b>\n\
               • R$ 50+ = +15% bonus\n\
               • R$ 100+ = +20% bonus\n\n\
               💡 Choose an amount:"
            .to_owned(),
        rows,
    }
}

/// Static help text.
#[must_use]
pub fn help_menu() -> Screen {
    Screen {
        text: "❓ <b>HELP CENTER</b>\n\n\
               🤖 <b>HOW IT WORKS:</b>\n\
               1. Recharge your balance\n\
               2. Choose the service you need\n\
               3. Receive the SMS number\n\
               4. Use it for verification\n\n\
               ⏱️ <b>DELIVERY TIME:</b>\n\
               • WhatsApp: 1-5 minutes\n\
               • Telegram: 1-3 minutes\n\
               • Instagram: 2-10 minutes\n\n\
               💬 <b>SUPPORT:</b>\n\
               For help, contact an administrator."
            .to_owned(),
        rows: vec![vec![Button::back(MAIN_MENU)]],
    }
}

/// Outcome of a simulated purchase.
#[must_use]
pub fn purchase_result(outcome: &PurchaseOutcome) -> Screen {
    match outcome {
        PurchaseOutcome::InsufficientFunds {
            balance,
            price,
            deficit,
            ..
        } => Screen {
            text: format!(
                "❌ <b>INSUFFICIENT BALANCE</b>\n\n\
                 💰 Your balance: {}\n\
                 💸 Required: {}\n\
                 📊 Missing: {}\n\n\
                 🔄 Recharge to continue!",
                brl(*balance),
                brl(*price),
                brl(*deficit),
            ),
            rows: vec![
                vec![Button::new("💳 RECHARGE", RECHARGE_MENU)],
                vec![Button::back(SERVICES_MENU)],
            ],
        },
        PurchaseOutcome::Issued {
            service,
            number,
            price,
        } => Screen {
            text: format!(
                "✅ <b>SMS NUMBER ACQUIRED</b>\n\n\
                 📱 Service: {}\n\
                 📞 Number: <code>{}</code>\n\
                 💰 Price: {}\n\n\
                 ⏱️ <b>WAITING FOR SMS...</b>\n\
                 The code will arrive within 10 minutes.\n\n\
                 💡 Use this number for verification!",
                escape(service),
                number,
                brl(*price),
            ),
            rows: vec![vec![Button::new("🔙 Main Menu", MAIN_MENU)]],
        },
    }
}

/// Manual payment instructions for a pending recharge.
#[must_use]
pub fn recharge_pending(pending: &PendingRecharge) -> Screen {
    let mut text = format!(
        "💳 <b>PAYMENT PROCESSING</b>\n\n\
         💰 Amount: {}\n\
         🔄 Status: Awaiting payment\n",
        brl(pending.amount),
    );
    if pending.bonus_percent > 0 {
        let _ = writeln!(
            text,
            "🎁 Bonus on confirmation: +{}% ({})",
            pending.bonus_percent,
            brl(pending.bonus_amount)
        );
    }
    text.push_str(
        "\n💡 <b>INSTRUCTIONS:</b>\n\
         1. Send the PIX payment to the key\n\
         2. Send the receipt\n\
         3. Wait for confirmation\n\n\
         ⚡ Processed within 5 minutes!",
    );

    Screen {
        text,
        rows: vec![vec![Button::back(RECHARGE_MENU)]],
    }
}

/// Aggregate account figures for the admin.
#[must_use]
pub fn admin_panel(stats: &AccountStats) -> Screen {
    let last = stats
        .last_registered_at
        .map_or_else(|| "never".to_owned(), |at| at.format("%Y-%m-%d %H:%M UTC").to_string());

    Screen {
        text: format!(
            "🛠️ <b>ADMIN PANEL</b>\n\n\
             👥 Accounts: {}\n\
             💰 Total balance: {}\n\
             🎁 Total bonus: {}\n\
             🕒 Last registration: {}",
            stats.accounts,
            brl(stats.total_balance),
            brl(stats.total_bonus),
            last,
        ),
        rows: vec![vec![Button::back(MAIN_MENU)]],
    }
}
