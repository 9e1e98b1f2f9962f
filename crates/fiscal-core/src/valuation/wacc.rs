use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::FiscalError;
use crate::types::{round_cents, Money, Percent};
use crate::FiscalResult;

/// Input parameters for Weighted Average Cost of Capital calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaccInput {
    /// Market value of equity
    pub equity_value: Money,
    /// Market value of debt
    pub debt_value: Money,
    /// Required return on equity
    pub cost_of_equity: Percent,
    /// Pre-tax cost of debt
    pub cost_of_debt: Percent,
    /// Marginal corporate tax rate
    pub corporate_tax_rate: Percent,
}

/// Calculate the Weighted Average Cost of Capital.
///
/// After-tax cost of debt: Kd_at = Kd * (1 - t)
/// WACC = E/V * Ke + D/V * Kd_at, with V = E + D
pub fn weighted_average_cost_of_capital(input: &WaccInput) -> FiscalResult<Percent> {
    validate_wacc_input(input)?;

    let capital = input.equity_value + input.debt_value;
    if capital.is_zero() {
        return Err(FiscalError::DivisionByZero {
            context: "WACC total capital".into(),
        });
    }

    let equity_weight = input.equity_value / capital;
    let debt_weight = input.debt_value / capital;
    let after_tax_cost_of_debt =
        input.cost_of_debt.value() * (Decimal::ONE - input.corporate_tax_rate.as_decimal());

    let wacc = equity_weight * input.cost_of_equity.value() + debt_weight * after_tax_cost_of_debt;
    Ok(Percent::new(round_cents(wacc)))
}

/// Expected return under CAPM: Rf + Beta * (Rm - Rf).
pub fn capital_asset_pricing_model(
    risk_free_rate: Percent,
    expected_market_return: Percent,
    beta: Decimal,
) -> Percent {
    let premium = expected_market_return.value() - risk_free_rate.value();
    Percent::new(round_cents(risk_free_rate.value() + beta * premium))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn validate_wacc_input(input: &WaccInput) -> FiscalResult<()> {
    if input.equity_value < Decimal::ZERO || input.debt_value < Decimal::ZERO {
        return Err(FiscalError::InvalidInput {
            field: "equity_value / debt_value".into(),
            reason: "Capital values cannot be negative".into(),
        });
    }
    if input.cost_of_debt.value() < Decimal::ZERO {
        return Err(FiscalError::InvalidInput {
            field: "cost_of_debt".into(),
            reason: "Cost of debt cannot be negative".into(),
        });
    }
    let tax = input.corporate_tax_rate.value();
    if tax < Decimal::ZERO || tax > dec!(100) {
        return Err(FiscalError::InvalidInput {
            field: "corporate_tax_rate".into(),
            reason: "Tax rate must be between 0% and 100%".into(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
