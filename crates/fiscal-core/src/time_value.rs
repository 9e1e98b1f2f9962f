use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::error::FiscalError;
use crate::types::{round_cents, Money, Percent, Rate};
use crate::FiscalResult;

/// Reject rates at or below -100%, where `1 + r` stops being a growth factor.
fn validate_rate(field: &str, rate: Rate) -> FiscalResult<()> {
    if rate <= dec!(-1) {
        return Err(FiscalError::InvalidInput {
            field: field.into(),
            reason: "Rate must be greater than -100%".into(),
        });
    }
    Ok(())
}

/// Result of arithmetic that leaves the `Decimal` range.
pub(crate) fn overflow(field: &str) -> FiscalError {
    FiscalError::InvalidInput {
        field: field.into(),
        reason: "Result exceeds the representable decimal range".into(),
    }
}

/// `value / factor` for a growth or discount factor that may have rounded
/// to zero.
fn divide_by_factor(value: Decimal, factor: Decimal, field: &str) -> FiscalResult<Decimal> {
    if factor.is_zero() {
        return Err(FiscalError::DivisionByZero {
            context: format!("{field} growth factor"),
        });
    }
    value.checked_div(factor).ok_or_else(|| overflow(field))
}

/// `(1 + rate)^periods`
pub(crate) fn growth_factor(rate: Rate, periods: u32) -> FiscalResult<Decimal> {
    validate_rate("rate", rate)?;
    (Decimal::ONE + rate)
        .checked_powi(i64::from(periods))
        .ok_or_else(|| FiscalError::InvalidInput {
            field: "periods".into(),
            reason: format!("Growth factor overflows over {periods} periods"),
        })
}

/// Net Present Value of a series of cash flows, the first flow undiscounted.
pub fn npv(rate: Rate, cash_flows: &[Money]) -> FiscalResult<Money> {
    validate_rate("rate", rate)?;

    let mut result = Decimal::ZERO;
    let one_plus_r = Decimal::ONE + rate;
    let mut discount = Decimal::ONE;

    for (t, cf) in cash_flows.iter().enumerate() {
        if t > 0 {
            match discount.checked_mul(one_plus_r) {
                Some(d) => discount = d,
                // Remaining flows are discounted past representable precision.
                None => break,
            }
        }
        if discount.is_zero() {
            return Err(FiscalError::DivisionByZero {
                context: format!("NPV discount factor at period {t}"),
            });
        }
        let term = cf.checked_div(discount).ok_or_else(|| overflow("cash_flows"))?;
        result = result.checked_add(term).ok_or_else(|| overflow("cash_flows"))?;
    }

    Ok(result)
}

/// Present value of flows received at the end of periods 1..=N.
pub(crate) fn discounted_inflows(rate: Rate, cash_flows: &[Money]) -> FiscalResult<Money> {
    validate_rate("rate", rate)?;
    // Discounting from period 1 equals NPV with a zero flow at period 0.
    let total = npv(rate, cash_flows)?;
    divide_by_factor(total, Decimal::ONE + rate, "cash_flows")
}

/// Payment (PMT), spreadsheet sign convention: a positive present value
/// yields a negative payment.
pub fn pmt(rate: Rate, nper: u32, present_value: Money, future_value: Money) -> FiscalResult<Money> {
    if nper == 0 {
        return Err(FiscalError::InvalidInput {
            field: "nper".into(),
            reason: "Number of periods must be > 0".into(),
        });
    }

    if rate.is_zero() {
        return Ok(-(present_value + future_value) / Decimal::from(nper));
    }

    // Scaled through by 1 / (1 + r)^n so long terms stay in range.
    let factor = growth_factor(rate, nper)?;
    let remaining = divide_by_factor(Decimal::ONE, factor, "nper")?;
    let annuity_factor = Decimal::ONE - remaining;

    if annuity_factor.is_zero() {
        return Err(FiscalError::DivisionByZero {
            context: "PMT annuity factor".into(),
        });
    }

    let payment = future_value
        .checked_mul(remaining)
        .and_then(|fv| present_value.checked_add(fv))
        .and_then(|balance| balance.checked_mul(rate))
        .and_then(|interest| interest.checked_div(annuity_factor))
        .ok_or_else(|| overflow("present_value"))?;
    Ok(-payment)
}

// ---------------------------------------------------------------------------
// Percent-denominated formulas, rounded to cents
// ---------------------------------------------------------------------------

/// Current value of `terminal_value` received after `years` at `rate`.
pub fn present_value(terminal_value: Money, rate: Percent, years: u32) -> FiscalResult<Money> {
    let factor = growth_factor(rate.as_decimal(), years)?;
    let value = divide_by_factor(terminal_value, factor, "terminal_value")?;
    Ok(round_cents(value))
}

/// Value of `initial_investment` after growing for `years` at `rate`.
pub fn future_value(initial_investment: Money, rate: Percent, years: u32) -> FiscalResult<Money> {
    let factor = growth_factor(rate.as_decimal(), years)?;
    let value = initial_investment
        .checked_mul(factor)
        .ok_or_else(|| overflow("initial_investment"))?;
    Ok(round_cents(value))
}

/// `principal` plus the cash flows discounted from period 0: the first flow
/// is taken at face value.
pub fn net_present_value(principal: Money, rate: Percent, cash_flows: &[Money]) -> FiscalResult<Money> {
    let discounted = npv(rate.as_decimal(), cash_flows)?;
    let total = principal
        .checked_add(discounted)
        .ok_or_else(|| overflow("cash_flows"))?;
    Ok(round_cents(total))
}

/// Final amount with interest compounded annually.
pub fn compound_interest(principal: Money, rate: Percent, years: u32) -> FiscalResult<Money> {
    let factor = growth_factor(rate.as_decimal(), years)?;
    let value = principal.checked_mul(factor).ok_or_else(|| overflow("principal"))?;
    Ok(round_cents(value))
}

/// Final amount with interest accrued on the principal only.
pub fn simple_interest(principal: Money, rate: Percent, years: u32) -> FiscalResult<Money> {
    let value = rate
        .as_decimal()
        .checked_mul(Decimal::from(years))
        .and_then(|accrued| accrued.checked_add(Decimal::ONE))
        .and_then(|growth| principal.checked_mul(growth))
        .ok_or_else(|| overflow("principal"))?;
    Ok(round_cents(value))
}

/// `principal` plus each flow discounted from the end of its own period.
pub fn discounted_cash_flow(principal: Money, cash_flows: &[Money], rate: Percent) -> FiscalResult<Money> {
    let discounted = discounted_inflows(rate.as_decimal(), cash_flows)?;
    let total = principal
        .checked_add(discounted)
        .ok_or_else(|| overflow("cash_flows"))?;
    Ok(round_cents(total))
}

/// `1 / (1 + r)^n`, expressed as a percentage.
pub fn discount_factor(rate: Percent, intervals: u32) -> FiscalResult<Percent> {
    let factor = growth_factor(rate.as_decimal(), intervals)?;
    let value = divide_by_factor(dec!(100), factor, "intervals")?;
    Ok(Percent::new(round_cents(value)))
}

/// Present value of future flows per unit of initial outlay.
pub fn profitability_index(principal: Money, rate: Percent, cash_flows: &[Money]) -> FiscalResult<Decimal> {
    if principal.is_zero() {
        return Err(FiscalError::DivisionByZero {
            context: "profitability index principal".into(),
        });
    }
    let discounted = discounted_inflows(rate.as_decimal(), cash_flows)?;
    let index = discounted
        .checked_div(principal.abs())
        .ok_or_else(|| overflow("principal"))?;
    Ok(round_cents(index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn pct(v: Decimal) -> Percent {
        Percent::new(v)
    }

    #[test]
    fn test_npv_basic() {
        let cfs = vec![dec!(-1000), dec!(300), dec!(400), dec!(500)];
        let result = npv(dec!(0.10), &cfs).unwrap();
        // NPV at 10%: -1000 + 300/1.1 + 400/1.21 + 500/1.331 ≈ -21.04
        assert!((result - dec!(-21.04)).abs() < dec!(0.01));
    }

    #[test]
    fn test_npv_zero_rate() {
        let cfs = vec![dec!(-100), dec!(50), dec!(50), dec!(50)];
        let result = npv(dec!(0.0), &cfs).unwrap();
        assert_eq!(result, dec!(50));
    }

    #[test]
    fn test_npv_rejects_rate_at_minus_100() {
        let err = npv(dec!(-1), &[dec!(10)]).unwrap_err();
        assert!(matches!(err, FiscalError::InvalidInput { .. }));
    }

    #[test]
    fn test_pmt_loan() {
        // 17,000 over 60 months at 2.71% / 12
        let payment = pmt(dec!(0.0271) / dec!(12), 60, dec!(17000), Decimal::ZERO).unwrap();
        assert_eq!(round_cents(-payment), dec!(303.28));
    }

    #[test]
    fn test_pmt_zero_rate_and_zero_periods() {
        assert_eq!(pmt(Decimal::ZERO, 10, dec!(1000), Decimal::ZERO).unwrap(), dec!(-100));
        assert!(pmt(dec!(0.01), 0, dec!(1000), Decimal::ZERO).is_err());
    }

    #[test]
    fn test_present_value() {
        assert_eq!(present_value(dec!(50000), pct(dec!(10)), 5).unwrap(), dec!(31046.07));
    }

    #[test]
    fn test_future_value() {
        assert_eq!(future_value(dec!(50000), pct(dec!(10)), 5).unwrap(), dec!(80525.5));
    }

    #[test]
    fn test_net_present_value() {
        let flows = [dec!(200000), dec!(300000), dec!(200000)];
        let result = net_present_value(dec!(-500000), pct(dec!(10)), &flows).unwrap();
        assert_eq!(result, dec!(138016.53));
    }

    #[test]
    fn test_compound_interest() {
        assert_eq!(compound_interest(dec!(92000), pct(dec!(7.5)), 31).unwrap(), dec!(865865.07));
    }

    #[test]
    fn test_simple_interest() {
        assert_eq!(simple_interest(dec!(92000), pct(dec!(7.5)), 31).unwrap(), dec!(305900));
    }

    #[test]
    fn test_discounted_cash_flow() {
        let flows = [dec!(20), dec!(40), dec!(60), dec!(20), dec!(70)];
        assert_eq!(discounted_cash_flow(dec!(100), &flows, pct(dec!(5))).unwrap(), dec!(278.46));
    }

    #[test]
    fn test_discount_factor() {
        assert_eq!(discount_factor(pct(dec!(10)), 5).unwrap().as_string(), "62.09%");
        assert_eq!(discount_factor(pct(dec!(10)), 0).unwrap().value(), dec!(100));
    }

    #[test]
    fn test_profitability_index_discounts_each_period() {
        // 110/1.1 + 121/1.21 = 200, over an outlay of 100
        let flows = [dec!(110), dec!(121)];
        assert_eq!(profitability_index(dec!(-100), pct(dec!(10)), &flows).unwrap(), dec!(2));
    }

    #[test]
    fn test_profitability_index_zero_principal() {
        let err = profitability_index(Decimal::ZERO, pct(dec!(10)), &[dec!(1)]).unwrap_err();
        assert!(matches!(err, FiscalError::DivisionByZero { .. }));
    }

    #[test]
    fn test_growth_factor_overflow_is_reported() {
        let err = future_value(dec!(1), pct(dec!(1000)), 500).unwrap_err();
        assert!(matches!(err, FiscalError::InvalidInput { .. }));
    }

    #[test]
    fn test_discount_factor_rounding_to_zero_is_reported() {
        // 0.1^40 is below the smallest representable decimal
        let pv = present_value(dec!(100), pct(dec!(-90)), 40).unwrap_err();
        assert!(matches!(pv, FiscalError::DivisionByZero { .. }));
        let df = discount_factor(pct(dec!(-90)), 40).unwrap_err();
        assert!(matches!(df, FiscalError::DivisionByZero { .. }));
    }

    #[test]
    fn test_discounted_flow_overflow_is_reported() {
        let flows = [dec!(1000000); 25];
        let err = net_present_value(Decimal::ZERO, pct(dec!(-90)), &flows).unwrap_err();
        assert!(matches!(err, FiscalError::InvalidInput { ref field, .. } if field == "cash_flows"));
    }

    #[test]
    fn test_compounding_overflow_is_reported() {
        // 2^90 fits, a million times it does not
        let fv = future_value(dec!(1000000), pct(dec!(100)), 90).unwrap_err();
        assert!(matches!(fv, FiscalError::InvalidInput { ref field, .. } if field == "initial_investment"));
        let ci = compound_interest(dec!(1000000), pct(dec!(100)), 90).unwrap_err();
        assert!(matches!(ci, FiscalError::InvalidInput { .. }));
        let si = simple_interest(Decimal::MAX, pct(dec!(10)), 5).unwrap_err();
        assert!(matches!(si, FiscalError::InvalidInput { .. }));
    }

    #[test]
    fn test_pmt_long_term_stays_in_range() {
        // (1.01)^6200 * 1e6 exceeds Decimal, the payment itself does not
        let payment = pmt(dec!(0.01), 6200, dec!(1000000), Decimal::ZERO).unwrap();
        assert_eq!(round_cents(-payment), dec!(10000));
    }

    #[test]
    fn test_negative_rate_discounting() {
        // -50% for one year doubles the present value
        assert_eq!(present_value(dec!(100), pct(dec!(-50)), 1).unwrap(), dec!(200));
        assert!(present_value(dec!(100), pct(dec!(-100)), 1).is_err());
    }
}
