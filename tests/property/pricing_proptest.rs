//! Property-based tests for reajuste arithmetic and BRL formatting

use proptest::prelude::*;

use cardapio::shared::money::{format_brl, to_cents};
use cardapio::shared::pricing::{Adjustment, AdjustmentMode, SkipReason};

fn magnitude() -> impl Strategy<Value = f64> {
    prop_oneof![-500.0f64..-0.01, 0.01f64..500.0]
}

proptest! {
    #[test]
    fn fixed_adds_magnitude(price in 0.0f64..10_000.0, m in magnitude()) {
        let adjustment = Adjustment::new(AdjustmentMode::Fixed, m).unwrap();
        let adjusted = adjustment.apply(price).unwrap();
        prop_assert!((adjusted - (price + m)).abs() < 1e-9);
    }

    #[test]
    fn percentage_scales_price(price in 0.0f64..10_000.0, m in magnitude()) {
        let adjustment = Adjustment::new(AdjustmentMode::Percentage, m).unwrap();
        let adjusted = adjustment.apply(price).unwrap();
        prop_assert!((adjusted - price * (1.0 + m / 100.0)).abs() < 1e-6);
    }

    #[test]
    fn negative_prices_are_never_adjusted(price in -10_000.0f64..-0.01, m in magnitude()) {
        let adjustment = Adjustment::new(AdjustmentMode::Fixed, m).unwrap();
        prop_assert_eq!(adjustment.apply(price), Err(SkipReason::NegativePrice));
    }

    #[test]
    fn brl_format_round_trips_cents(cents in 0i64..100_000_000) {
        let formatted = format_brl(cents as f64 / 100.0);
        prop_assert!(formatted.starts_with("R$ "));
        let digits: String = formatted.chars().filter(|c| c.is_ascii_digit()).collect();
        prop_assert_eq!(digits.parse::<i64>().unwrap(), cents);
        prop_assert_eq!(to_cents(cents as f64 / 100.0), cents);
    }
}
