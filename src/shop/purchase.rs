//! Simulated number purchase.

use rand::Rng;

use super::catalog::{NUMBER_PREFIX, find_service, price_for};

/// Result of a simulated purchase.
///
/// Neither variant changes the stored balance.
#[derive(Debug, Clone, PartialEq)]
pub enum PurchaseOutcome {
    /// The balance does not cover the price.
    InsufficientFunds {
        service: String,
        balance: f64,
        price: f64,
        deficit: f64,
    },

    /// A placeholder number was issued.
    Issued {
        service: String,
        number: String,
        price: f64,
    },
}

impl PurchaseOutcome {
    /// Display name of the requested service.
    #[must_use]
    pub fn service(&self) -> &str {
        match self {
            Self::InsufficientFunds { service, .. } | Self::Issued { service, .. } => service,
        }
    }
}

/// Prices `service_key` against `balance` and issues a placeholder number if affordable.
pub fn simulate_purchase<R: Rng + ?Sized>(
    service_key: &str,
    balance: f64,
    rng: &mut R,
) -> PurchaseOutcome {
    let price = price_for(service_key);
    let service = find_service(service_key)
        .map_or_else(|| service_key.to_uppercase(), |s| s.name.to_uppercase());

    if balance < price {
        return PurchaseOutcome::InsufficientFunds {
            service,
            balance,
            price,
            deficit: price - balance,
        };
    }

    PurchaseOutcome::Issued {
        service,
        number: placeholder_number(rng),
        price,
    }
}

/// Generates `+55119` followed by eight random digits.
pub fn placeholder_number<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("{NUMBER_PREFIX}{}", rng.gen_range(10_000_000..=99_999_999u32))
}

/// Masks a phone number for logging (shows last 4 digits).
#[must_use]
pub fn mask_number(number: &str) -> String {
    let digits: String = number.chars().filter(char::is_ascii_digit).collect();
    if digits.len() > 4 {
        format!("***{}", &digits[digits.len() - 4..])
    } else {
        "****".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn is_placeholder(number: &str) -> bool {
        number.len() == NUMBER_PREFIX.len() + 8
            && number.starts_with(NUMBER_PREFIX)
            && number[NUMBER_PREFIX.len()..].chars().all(|c| c.is_ascii_digit())
    }

    #[test]
    fn test_insufficient_funds_reports_deficit() {
        let mut rng = StdRng::seed_from_u64(1);
        let outcome = simulate_purchase("whatsapp", 0.0, &mut rng);

        match outcome {
            PurchaseOutcome::InsufficientFunds {
                service,
                balance,
                price,
                deficit,
            } => {
                assert_eq!(service, "WHATSAPP");
                assert!(balance.abs() < f64::EPSILON);
                assert!((price - 2.50).abs() < f64::EPSILON);
                assert!((deficit - 2.50).abs() < f64::EPSILON);
            }
            other => panic!("expected insufficient funds, got {other:?}"),
        }
    }

    #[test]
    fn test_success_issues_placeholder_number() {
        let mut rng = StdRng::seed_from_u64(7);
        let outcome = simulate_purchase("google", 10.0, &mut rng);

        match outcome {
            PurchaseOutcome::Issued { service, number, price } => {
                assert_eq!(service, "GOOGLE");
                assert!((price - 2.80).abs() < f64::EPSILON);
                assert!(is_placeholder(&number), "unexpected number {number}");
            }
            other => panic!("expected issued number, got {other:?}"),
        }
    }

    #[test]
    fn test_exact_balance_is_enough() {
        let mut rng = StdRng::seed_from_u64(3);
        let outcome = simulate_purchase("telegram", 3.0, &mut rng);
        assert!(matches!(outcome, PurchaseOutcome::Issued { .. }));
    }

    #[test]
    fn test_unknown_service_uses_default_price() {
        let mut rng = StdRng::seed_from_u64(3);
        let outcome = simulate_purchase("tiktok", 1.0, &mut rng);
        assert_eq!(outcome.service(), "TIKTOK");
        match outcome {
            PurchaseOutcome::InsufficientFunds { price, deficit, .. } => {
                assert!((price - 2.50).abs() < f64::EPSILON);
                assert!((deficit - 1.50).abs() < f64::EPSILON);
            }
            other => panic!("expected insufficient funds, got {other:?}"),
        }
    }

    #[test]
    fn test_placeholder_numbers_always_match_pattern() {
        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..500 {
            let number = placeholder_number(&mut rng);
            assert!(is_placeholder(&number), "unexpected number {number}");
        }
    }

    #[test]
    fn test_mask_number() {
        assert_eq!(mask_number("+5511912345678"), "***5678");
        assert_eq!(mask_number("123"), "****");
    }
}
