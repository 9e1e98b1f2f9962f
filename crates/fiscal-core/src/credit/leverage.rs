use rust_decimal::Decimal;

use crate::error::FiscalError;
use crate::types::{round_cents, Money};
use crate::FiscalResult;

/// Liabilities and debts carried per unit of income, to two decimals.
pub fn leverage_ratio(liabilities: Money, debts: Money, total_income: Money) -> FiscalResult<Decimal> {
    if total_income.is_zero() {
        return Err(FiscalError::DivisionByZero {
            context: "leverage ratio total income".into(),
        });
    }
    Ok(round_cents((liabilities + debts) / total_income))
}
