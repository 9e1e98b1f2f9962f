//! Loan amortization: level monthly payments, the rate a payment implies,
//! and period-by-period repayment schedules.
//!
//! Terms are counted in whole months. A term given in years is converted at
//! twelve months per year; an initial payment made at signing removes one
//! month from the amortized term.

use rust_decimal::{Decimal, MathematicalOps, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::FiscalError;
use crate::time_value::{overflow, pmt};
use crate::types::{round_cents, Currency, FormatOptions, Money, Percent, Rate};
use crate::FiscalResult;

const MONTHS_PER_YEAR: u32 = 12;

/// Bisection convergence tolerance on the monthly rate.
const RATE_TOLERANCE: Decimal = dec!(0.000000000001);

/// Maximum bisection iterations.
const MAX_BISECTION_ITERATIONS: u32 = 200;

/// Upper bracket for the monthly rate (120% a year).
const MAX_MONTHLY_RATE: Rate = dec!(0.1);

// ---------------------------------------------------------------------------
// Loan terms
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PeriodUnit {
    Years,
    Months,
}

/// Length of a loan and whether one payment is made up front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanTerm {
    pub periods: u32,
    pub unit: PeriodUnit,
    #[serde(default)]
    pub include_initial_payment: bool,
}

impl LoanTerm {
    pub fn years(periods: u32) -> Self {
        LoanTerm {
            periods,
            unit: PeriodUnit::Years,
            include_initial_payment: false,
        }
    }

    pub fn months(periods: u32) -> Self {
        LoanTerm {
            periods,
            unit: PeriodUnit::Months,
            include_initial_payment: false,
        }
    }

    pub fn with_initial_payment(mut self) -> Self {
        self.include_initial_payment = true;
        self
    }

    /// Number of monthly payments left to amortize.
    pub fn months_payable(&self) -> FiscalResult<u32> {
        let months = match self.unit {
            PeriodUnit::Months => self.periods,
            PeriodUnit::Years => self.periods.checked_mul(MONTHS_PER_YEAR).ok_or_else(|| {
                FiscalError::InvalidInput {
                    field: "periods".into(),
                    reason: format!("{} years is too long a term", self.periods),
                }
            })?,
        };
        let months = if self.include_initial_payment {
            months.saturating_sub(1)
        } else {
            months
        };
        if months == 0 {
            return Err(FiscalError::InvalidInput {
                field: "periods".into(),
                reason: "Loan term must leave at least one payment to amortize".into(),
            });
        }
        Ok(months)
    }

    /// Amortized term in (possibly fractional) years.
    pub fn years_payable(&self) -> FiscalResult<Decimal> {
        Ok(Decimal::from(self.months_payable()?) / Decimal::from(MONTHS_PER_YEAR))
    }
}

/// One month of a repayment schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmortizationRow {
    pub period: u32,
    pub payment: Money,
    pub interest: Money,
    pub principal: Money,
    pub balance: Money,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Amortization calculations producing values formatted with `options`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Amortization {
    options: FormatOptions,
}

impl Amortization {
    pub fn new(options: FormatOptions) -> Self {
        Amortization { options }
    }

    pub fn options(&self) -> &FormatOptions {
        &self.options
    }

    /// Level monthly payment that repays `principal` over `term` at
    /// `annual_rate`. A zero rate spreads the principal evenly.
    pub fn for_monthly_payment(
        &self,
        principal: Money,
        annual_rate: Percent,
        term: LoanTerm,
    ) -> FiscalResult<Currency> {
        let months = term.months_payable()?;
        let payment = -pmt(monthly_rate(annual_rate), months, principal, Decimal::ZERO)?;
        Ok(Currency::with_options(round_cents(payment), self.options.clone()))
    }

    /// Whole-percent annual rate implied by treating everything paid above
    /// `principal` as simple interest.
    ///
    /// This approximates; `for_annual_rate` solves the amortizing rate.
    pub fn for_interest(&self, principal: Money, payment: Money, term: LoanTerm) -> FiscalResult<Percent> {
        if principal.is_zero() {
            return Err(FiscalError::DivisionByZero {
                context: "simple interest principal".into(),
            });
        }
        let months = Decimal::from(term.months_payable()?);
        let years = term.years_payable()?;

        let rate = payment
            .checked_mul(months)
            .and_then(|paid| paid.checked_sub(principal))
            .and_then(|interest| interest.checked_mul(dec!(100)))
            .and_then(|interest| principal.checked_mul(years).and_then(|d| interest.checked_div(d)))
            .ok_or_else(|| overflow("payment"))?;
        Ok(Percent::new(
            rate.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero),
        ))
    }

    /// Annual rate, to two decimals, at which `payment` each month repays
    /// `principal` over `term`. Inverse of `for_monthly_payment`.
    pub fn for_annual_rate(&self, principal: Money, payment: Money, term: LoanTerm) -> FiscalResult<Percent> {
        if principal <= Decimal::ZERO || payment <= Decimal::ZERO {
            return Err(FiscalError::InvalidInput {
                field: "principal / payment".into(),
                reason: "Principal and payment must be positive".into(),
            });
        }
        let months = term.months_payable()?;
        let total_paid = payment
            .checked_mul(Decimal::from(months))
            .ok_or_else(|| overflow("payment"))?;

        if total_paid < principal {
            return Err(FiscalError::InvalidInput {
                field: "payment".into(),
                reason: format!("{months} payments of {payment} do not repay {principal}"),
            });
        }
        if total_paid == principal {
            return Ok(Percent::new(Decimal::ZERO));
        }
        if level_payment(principal, MAX_MONTHLY_RATE, months)? < payment {
            return Err(FiscalError::InvalidInput {
                field: "payment".into(),
                reason: "Payment implies an annual rate above 120%".into(),
            });
        }

        let monthly = bisect_monthly_rate(principal, payment, months)?;
        Ok(Percent::new(round_cents(
            monthly * Decimal::from(MONTHS_PER_YEAR) * dec!(100),
        )))
    }

    /// Month-by-month split of each payment into interest and principal.
    ///
    /// Interest is rounded to cents each month; the final payment absorbs the
    /// accumulated rounding so the balance closes at zero.
    pub fn schedule(
        &self,
        principal: Money,
        annual_rate: Percent,
        term: LoanTerm,
    ) -> FiscalResult<Vec<AmortizationRow>> {
        let months = term.months_payable()?;
        let rate = monthly_rate(annual_rate);
        let payment = self.for_monthly_payment(principal, annual_rate, term)?.as_number();

        let mut rows = Vec::with_capacity(months as usize);
        let mut balance = principal;
        for period in 1..=months {
            let interest = round_cents(balance.checked_mul(rate).ok_or_else(|| overflow("principal"))?);
            let (due, repaid) = if period == months {
                (interest + balance, balance)
            } else {
                (payment, payment - interest)
            };
            balance -= repaid;
            rows.push(AmortizationRow {
                period,
                payment: due,
                interest,
                principal: repaid,
                balance,
            });
        }
        Ok(rows)
    }

    /// Present value of a stream of payments. Not yet supported.
    pub fn for_present_value(
        &self,
        _payment: Money,
        _annual_rate: Percent,
        _term: LoanTerm,
    ) -> FiscalResult<Currency> {
        Err(FiscalError::NotImplemented {
            operation: "Amortization::for_present_value".into(),
        })
    }

    /// Number of periods needed to repay a loan. Not yet supported.
    pub fn for_number_of_periods(
        &self,
        _principal: Money,
        _annual_rate: Percent,
        _unit: PeriodUnit,
        _include_initial_payment: bool,
    ) -> FiscalResult<u32> {
        Err(FiscalError::NotImplemented {
            operation: "Amortization::for_number_of_periods".into(),
        })
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn monthly_rate(annual_rate: Percent) -> Rate {
    Percent::new(annual_rate.value() / Decimal::from(MONTHS_PER_YEAR)).as_decimal()
}

/// Level payment at a non-negative monthly rate, `P·r / (1 - (1 + r)^-n)`.
/// Falls back to the perpetuity payment once `(1 + r)^n` leaves the
/// representable range.
fn level_payment(principal: Money, rate: Rate, months: u32) -> FiscalResult<Money> {
    if rate.is_zero() {
        return Ok(principal / Decimal::from(months));
    }
    let interest = principal.checked_mul(rate).ok_or_else(|| overflow("principal"))?;
    let remaining = match (Decimal::ONE + rate).checked_powi(i64::from(months)) {
        Some(factor) if !factor.is_zero() => Decimal::ONE / factor,
        _ => Decimal::ZERO,
    };
    let annuity_factor = Decimal::ONE - remaining;
    if annuity_factor.is_zero() {
        return Err(FiscalError::DivisionByZero {
            context: format!("annuity factor at monthly rate {rate}"),
        });
    }
    interest.checked_div(annuity_factor).ok_or_else(|| overflow("principal"))
}

/// Bisection on the monthly rate; payment increases monotonically with rate.
fn bisect_monthly_rate(principal: Money, payment: Money, months: u32) -> FiscalResult<Rate> {
    let mut lo = Decimal::ZERO;
    let mut hi = MAX_MONTHLY_RATE;

    for i in 0..MAX_BISECTION_ITERATIONS {
        let mid = (lo + hi) / dec!(2);
        if level_payment(principal, mid, months)? < payment {
            lo = mid;
        } else {
            hi = mid;
        }
        if hi - lo < RATE_TOLERANCE {
            debug!(iterations = i + 1, monthly_rate = %mid, "amortization rate solved");
            return Ok((lo + hi) / dec!(2));
        }
    }

    Err(FiscalError::ConvergenceFailure {
        function: "Amortization rate".into(),
        iterations: MAX_BISECTION_ITERATIONS,
        last_delta: hi - lo,
    })
}
