//! Stateless facade over the formula modules.
//!
//! `Fiscal` carries only its `FormatOptions`; every monetary result is
//! returned as a `Currency` formatted with them. Build one per caller with
//! `Fiscal::new`, or re-configure an owned facade with `with_options`.

use rust_decimal::Decimal;

use crate::amortization::Amortization;
use crate::irr;
use crate::returns;
use crate::time_value;
use crate::types::{Currency, FormatOptions, Money, Percent};
use crate::FiscalResult;

#[cfg(feature = "credit")]
use crate::credit;
#[cfg(feature = "income")]
use crate::income;
#[cfg(feature = "valuation")]
use crate::valuation::{self, WaccInput};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fiscal {
    options: FormatOptions,
}

impl Fiscal {
    pub fn new(options: FormatOptions) -> Self {
        Fiscal { options }
    }

    /// Replace the options of this facade.
    pub fn with_options(mut self, options: FormatOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &FormatOptions {
        &self.options
    }

    /// Amortization engine sharing this facade's options.
    pub fn amortization(&self) -> Amortization {
        Amortization::new(self.options.clone())
    }

    fn currency(&self, amount: Money) -> Currency {
        Currency::with_options(amount, self.options.clone())
    }

    // -----------------------------------------------------------------------
    // Time value of money
    // -----------------------------------------------------------------------

    pub fn present_value(&self, terminal_value: Money, rate: Percent, years: u32) -> FiscalResult<Currency> {
        time_value::present_value(terminal_value, rate, years).map(|v| self.currency(v))
    }

    pub fn future_value(&self, initial_investment: Money, rate: Percent, years: u32) -> FiscalResult<Currency> {
        time_value::future_value(initial_investment, rate, years).map(|v| self.currency(v))
    }

    pub fn net_present_value(
        &self,
        principal: Money,
        rate: Percent,
        cash_flows: &[Money],
    ) -> FiscalResult<Currency> {
        time_value::net_present_value(principal, rate, cash_flows).map(|v| self.currency(v))
    }

    pub fn compound_interest(&self, principal: Money, rate: Percent, years: u32) -> FiscalResult<Currency> {
        time_value::compound_interest(principal, rate, years).map(|v| self.currency(v))
    }

    pub fn simple_interest(&self, principal: Money, rate: Percent, years: u32) -> FiscalResult<Currency> {
        time_value::simple_interest(principal, rate, years).map(|v| self.currency(v))
    }

    pub fn discounted_cash_flow(
        &self,
        principal: Money,
        cash_flows: &[Money],
        rate: Percent,
    ) -> FiscalResult<Currency> {
        time_value::discounted_cash_flow(principal, cash_flows, rate).map(|v| self.currency(v))
    }

    pub fn discount_factor(&self, rate: Percent, intervals: u32) -> FiscalResult<Percent> {
        time_value::discount_factor(rate, intervals)
    }

    pub fn profitability_index(
        &self,
        principal: Money,
        rate: Percent,
        cash_flows: &[Money],
    ) -> FiscalResult<Decimal> {
        time_value::profitability_index(principal, rate, cash_flows)
    }

    pub fn internal_rate_of_return(&self, principal: Money, cash_flows: &[Money]) -> FiscalResult<Percent> {
        irr::internal_rate_of_return(principal, cash_flows)
    }

    // -----------------------------------------------------------------------
    // Returns and growth
    // -----------------------------------------------------------------------

    pub fn return_on_investment(&self, initial_investment: Money, earnings: Money) -> FiscalResult<Percent> {
        returns::return_on_investment(initial_investment, earnings)
    }

    pub fn compounded_annual_growth_rate(
        &self,
        initial_investment: Money,
        terminal_value: Money,
        years: u32,
    ) -> FiscalResult<Percent> {
        returns::compounded_annual_growth_rate(initial_investment, terminal_value, years)
    }

    pub fn payback_intervals(&self, amount_due: Money, interval_payment: Money) -> FiscalResult<u64> {
        returns::payback_intervals(amount_due, interval_payment)
    }

    pub fn rule_of_72(&self, rate: Percent) -> FiscalResult<Decimal> {
        returns::rule_of_72(rate)
    }

    pub fn year_over_year(&self, current_value: Decimal, past_value: Decimal) -> FiscalResult<Percent> {
        returns::year_over_year(current_value, past_value)
    }

    pub fn percent_of(&self, percent: Percent, value: Money) -> Currency {
        self.currency(returns::percent_of(percent, value))
    }

    // -----------------------------------------------------------------------
    // Feature-gated families
    // -----------------------------------------------------------------------

    #[cfg(feature = "credit")]
    pub fn leverage_ratio(&self, liabilities: Money, debts: Money, total_income: Money) -> FiscalResult<Decimal> {
        credit::leverage_ratio(liabilities, debts, total_income)
    }

    #[cfg(feature = "income")]
    pub fn salary_per_year(&self, hourly_rate: Money, tax_rate: Option<Percent>) -> FiscalResult<Currency> {
        income::salary_per_year(hourly_rate, tax_rate).map(|v| self.currency(v))
    }

    #[cfg(feature = "income")]
    pub fn salary_per_month(&self, hourly_rate: Money, tax_rate: Option<Percent>) -> FiscalResult<Currency> {
        income::salary_per_month(hourly_rate, tax_rate).map(|v| self.currency(v))
    }

    #[cfg(feature = "income")]
    pub fn hourly_wage(&self, annual_salary: Money) -> Currency {
        self.currency(income::hourly_wage(annual_salary))
    }

    #[cfg(feature = "valuation")]
    pub fn weighted_average_cost_of_capital(&self, input: &WaccInput) -> FiscalResult<Percent> {
        valuation::weighted_average_cost_of_capital(input)
    }

    #[cfg(feature = "valuation")]
    pub fn capital_asset_pricing_model(
        &self,
        risk_free_rate: Percent,
        expected_market_return: Percent,
        beta: Decimal,
    ) -> Percent {
        valuation::capital_asset_pricing_model(risk_free_rate, expected_market_return, beta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CurrencyCode;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_options() {
        let fiscal = Fiscal::default();
        assert_eq!(fiscal.options(), &FormatOptions::default());
        let pv = fiscal.present_value(dec!(50000), Percent::new(dec!(10)), 5).unwrap();
        assert_eq!(pv.as_formatted_string(None, None).unwrap(), "$31,046.07");
    }

    #[test]
    fn test_options_propagate_to_currency() {
        let fiscal = Fiscal::new(FormatOptions::new(CurrencyCode::EUR, "de-DE"));
        let fv = fiscal.future_value(dec!(50000), Percent::new(dec!(10)), 5).unwrap();
        assert_eq!(fv.options(), fiscal.options());
        assert_eq!(fv.as_formatted_string(None, None).unwrap(), "80.525,50\u{a0}€");

        let payment = fiscal
            .amortization()
            .for_monthly_payment(dec!(17000), Percent::new(dec!(2.71)), crate::LoanTerm::years(5))
            .unwrap();
        assert_eq!(payment.options(), fiscal.options());
    }

    #[test]
    fn test_with_options_replaces_options() {
        let gbp_options = FormatOptions::new(CurrencyCode::GBP, "en-GB");
        let fiscal = Fiscal::default();
        let gbp = fiscal.clone().with_options(gbp_options.clone());
        assert_eq!(gbp.options(), &gbp_options);
        assert_eq!(gbp, Fiscal::new(gbp_options));

        let amount = gbp.percent_of(Percent::new(dec!(10)), dec!(12345));
        assert_eq!(amount.as_formatted_string(None, None).unwrap(), "£1,234.50");
        assert_eq!(fiscal.options(), &FormatOptions::default());
    }

    #[test]
    fn test_facade_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Fiscal>();
        assert_send_sync::<Currency>();
    }
}
