//! Conversions between hourly, monthly and yearly pay, assuming a full-time
//! schedule of 40 hours a week, 52 weeks a year.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::FiscalError;
use crate::types::{round_cents, Money, Percent};
use crate::FiscalResult;

pub const WEEKS_PER_YEAR: u32 = 52;
pub const HOURS_PER_WEEK: u32 = 40;
const MONTHS_PER_YEAR: u32 = 12;

fn hours_per_year() -> Decimal {
    Decimal::from(WEEKS_PER_YEAR * HOURS_PER_WEEK)
}

fn validate_tax_rate(tax_rate: Option<Percent>) -> FiscalResult<Decimal> {
    let rate = tax_rate.map(|t| t.value()).unwrap_or_default();
    if rate < Decimal::ZERO || rate > dec!(100) {
        return Err(FiscalError::InvalidInput {
            field: "tax_rate".into(),
            reason: "Tax rate must be between 0% and 100%".into(),
        });
    }
    Ok(rate / dec!(100))
}

/// Yearly pay for `hourly_rate`, net of `tax_rate` when given.
pub fn salary_per_year(hourly_rate: Money, tax_rate: Option<Percent>) -> FiscalResult<Money> {
    let tax = validate_tax_rate(tax_rate)?;
    let gross = hourly_rate * hours_per_year();
    Ok(round_cents(gross - gross * tax))
}

/// Monthly pay for `hourly_rate`, net of `tax_rate` when given.
pub fn salary_per_month(hourly_rate: Money, tax_rate: Option<Percent>) -> FiscalResult<Money> {
    let tax = validate_tax_rate(tax_rate)?;
    let gross = hourly_rate * hours_per_year();
    Ok(round_cents((gross - gross * tax) / Decimal::from(MONTHS_PER_YEAR)))
}

/// Hourly rate equivalent to `annual_salary`.
pub fn hourly_wage(annual_salary: Money) -> Money {
    round_cents(annual_salary / hours_per_year())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_salary_per_year() {
        assert_eq!(salary_per_year(dec!(25), None).unwrap(), dec!(52000));
        assert_eq!(
            salary_per_year(dec!(25), Some(Percent::new(dec!(20)))).unwrap(),
            dec!(41600)
        );
    }

    #[test]
    fn test_salary_per_month() {
        // 52,000 / 12 = 4,333.33
        assert_eq!(salary_per_month(dec!(25), None).unwrap(), dec!(4333.33));
        assert_eq!(
            salary_per_month(dec!(25), Some(Percent::new(dec!(25)))).unwrap(),
            dec!(3250)
        );
    }

    #[test]
    fn test_hourly_wage() {
        assert_eq!(hourly_wage(dec!(52000)), dec!(25));
        assert_eq!(hourly_wage(dec!(100000)), dec!(48.08));
    }

    #[test]
    fn test_invalid_tax_rate() {
        assert!(salary_per_year(dec!(25), Some(Percent::new(dec!(-1)))).is_err());
        assert!(salary_per_month(dec!(25), Some(Percent::new(dec!(101)))).is_err());
    }
}
