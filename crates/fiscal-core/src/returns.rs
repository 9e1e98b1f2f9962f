use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::error::FiscalError;
use crate::types::{round_cents, Money, Percent};
use crate::FiscalResult;

/// Gain on an investment relative to its cost. The sign of
/// `initial_investment` is ignored.
pub fn return_on_investment(initial_investment: Money, earnings: Money) -> FiscalResult<Percent> {
    let cost = initial_investment.abs();
    if cost.is_zero() {
        return Err(FiscalError::DivisionByZero {
            context: "ROI initial investment".into(),
        });
    }
    let roi = (earnings - cost) / cost * dec!(100);
    Ok(Percent::new(round_cents(roi)))
}

/// Compound annual growth rate, to two decimals.
pub fn compounded_annual_growth_rate(
    initial_investment: Money,
    terminal_value: Money,
    years: u32,
) -> FiscalResult<Percent> {
    if years == 0 {
        return Err(FiscalError::InvalidInput {
            field: "years".into(),
            reason: "CAGR requires at least one year".into(),
        });
    }
    if initial_investment.is_zero() {
        return Err(FiscalError::DivisionByZero {
            context: "CAGR initial investment".into(),
        });
    }
    let growth = terminal_value / initial_investment;
    if growth < Decimal::ZERO {
        return Err(FiscalError::InvalidInput {
            field: "terminal_value".into(),
            reason: "Initial and terminal values must share a sign".into(),
        });
    }
    let cagr = nth_root(growth, years) - Decimal::ONE;
    Ok(Percent::new(round_cents(cagr * dec!(100))))
}

/// Number of payments of `interval_payment` needed to cover `amount_due`,
/// rounded up.
pub fn payback_intervals(amount_due: Money, interval_payment: Money) -> FiscalResult<u64> {
    if interval_payment <= Decimal::ZERO {
        return Err(FiscalError::InvalidInput {
            field: "interval_payment".into(),
            reason: "Payment per interval must be positive".into(),
        });
    }
    if amount_due < Decimal::ZERO {
        return Err(FiscalError::InvalidInput {
            field: "amount_due".into(),
            reason: "Amount due cannot be negative".into(),
        });
    }
    let intervals = (amount_due / interval_payment).ceil();
    intervals.to_u64().ok_or_else(|| FiscalError::InvalidInput {
        field: "amount_due".into(),
        reason: format!("{intervals} intervals do not fit a 64-bit count"),
    })
}

/// Years for money to double at `rate`, by the rule of 72.
pub fn rule_of_72(rate: Percent) -> FiscalResult<Decimal> {
    if rate.value().is_zero() {
        return Err(FiscalError::DivisionByZero {
            context: "rule of 72 rate".into(),
        });
    }
    Ok(round_cents(dec!(72) / rate.value()))
}

/// Change from `past_value` to `current_value`, relative to the past value.
pub fn year_over_year(current_value: Decimal, past_value: Decimal) -> FiscalResult<Percent> {
    if past_value.is_zero() {
        return Err(FiscalError::DivisionByZero {
            context: "year-over-year past value".into(),
        });
    }
    let change = (current_value - past_value) / past_value.abs() * dec!(100);
    Ok(Percent::new(round_cents(change)))
}

/// `percent` of `value`.
pub fn percent_of(percent: Percent, value: Money) -> Money {
    round_cents(value * percent.as_decimal())
}

/// Compute the nth root of x using Newton's method (40 iterations), seeded
/// from `exp(ln(x) / n)`.
fn nth_root(x: Decimal, n: u32) -> Decimal {
    if x == Decimal::ONE || x.is_zero() || n == 1 {
        return x;
    }

    let n_dec = Decimal::from(n);
    let n_minus_1 = i64::from(n - 1);
    let mut guess = x
        .checked_ln()
        .and_then(|ln| (ln / n_dec).checked_exp())
        .unwrap_or(Decimal::ONE);

    for _ in 0..40 {
        let g_n_minus_1 = match guess.checked_powi(n_minus_1) {
            Some(v) if !v.is_zero() => v,
            _ => break,
        };
        let g_n = g_n_minus_1 * guess;

        let delta = (g_n - x) / (n_dec * g_n_minus_1);
        guess -= delta;

        if delta.abs() < dec!(0.0000000000001) {
            break;
        }
    }

    guess
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_roi() {
        let roi = return_on_investment(dec!(-50000), dec!(200000)).unwrap();
        assert_eq!(roi.as_string(), "300%");
        let loss = return_on_investment(dec!(1000), dec!(750)).unwrap();
        assert_eq!(loss.value(), dec!(-25));
    }

    #[test]
    fn test_roi_zero_investment() {
        assert!(matches!(
            return_on_investment(Decimal::ZERO, dec!(10)),
            Err(FiscalError::DivisionByZero { .. })
        ));
    }

    #[test]
    fn test_cagr_two_decimals() {
        let cagr = compounded_annual_growth_rate(dec!(50000), dec!(100000), 5).unwrap();
        assert_eq!(cagr.as_string(), "14.87%");
    }

    #[test]
    fn test_cagr_decline_and_flat() {
        let halved = compounded_annual_growth_rate(dec!(100), dec!(25), 2).unwrap();
        assert_eq!(halved.value(), dec!(-50));
        let flat = compounded_annual_growth_rate(dec!(100), dec!(100), 7).unwrap();
        assert_eq!(flat.value(), Decimal::ZERO);
    }

    #[test]
    fn test_cagr_invalid_inputs() {
        assert!(compounded_annual_growth_rate(dec!(100), dec!(200), 0).is_err());
        assert!(compounded_annual_growth_rate(Decimal::ZERO, dec!(200), 3).is_err());
        assert!(compounded_annual_growth_rate(dec!(100), dec!(-200), 3).is_err());
    }

    #[test]
    fn test_payback_rounds_up() {
        assert_eq!(payback_intervals(dec!(23456), dec!(525)).unwrap(), 45);
        assert_eq!(payback_intervals(dec!(1000), dec!(250)).unwrap(), 4);
        assert_eq!(payback_intervals(Decimal::ZERO, dec!(250)).unwrap(), 0);
    }

    #[test]
    fn test_payback_invalid_payment() {
        assert!(payback_intervals(dec!(100), Decimal::ZERO).is_err());
        assert!(payback_intervals(dec!(100), dec!(-5)).is_err());
        assert!(payback_intervals(dec!(-100), dec!(5)).is_err());
    }

    #[test]
    fn test_rule_of_72() {
        assert_eq!(rule_of_72(Percent::new(dec!(6))).unwrap(), dec!(12));
        assert_eq!(rule_of_72(Percent::new(dec!(7))).unwrap(), dec!(10.29));
        assert!(rule_of_72(Percent::new(Decimal::ZERO)).is_err());
    }

    #[test]
    fn test_year_over_year() {
        assert_eq!(year_over_year(dec!(120), dec!(100)).unwrap().as_string(), "20%");
        assert_eq!(year_over_year(dec!(90), dec!(120)).unwrap().value(), dec!(-25));
        // Recovering from a loss is growth
        assert_eq!(year_over_year(dec!(-50), dec!(-100)).unwrap().value(), dec!(50));
        assert!(year_over_year(dec!(1), Decimal::ZERO).is_err());
    }

    #[test]
    fn test_percent_of() {
        assert_eq!(percent_of(Percent::new(dec!(15)), dec!(200)), dec!(30));
        assert_eq!(percent_of(Percent::new(dec!(2.5)), dec!(99.99)), dec!(2.50));
    }

    #[test]
    fn test_nth_root() {
        assert!((nth_root(dec!(2), 5) - dec!(1.148698355)).abs() < dec!(0.000000001));
        assert!((nth_root(dec!(0.25), 2) - dec!(0.5)).abs() < dec!(0.000000001));
    }
}
