//! Internal rate of return by bracket-and-step search.
//!
//! The search climbs in whole-percent steps until NPV turns non-positive,
//! then walks back down in basis-point steps to the zero crossing. It is
//! deterministic and bounded by `MAX_NPV_EVALUATIONS`; it assumes a single
//! real root above the starting rate and does not detect multiple roots.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::{debug, trace};

use crate::error::FiscalError;
use crate::types::{round_cents, Money, Percent};
use crate::FiscalResult;

/// Hard cap on NPV evaluations for a single solve.
pub const MAX_NPV_EVALUATIONS: u32 = 1000;

const START_RATE: Decimal = dec!(1);
const COARSE_STEP: Decimal = dec!(1);
const FINE_STEP: Decimal = dec!(0.01);

/// NPV at a percentage rate, counting every evaluation against the cap.
struct NpvEvaluator<'a> {
    outflow: Money,
    cash_flows: &'a [Money],
    evaluations: u32,
    last_npv: Decimal,
}

impl<'a> NpvEvaluator<'a> {
    fn new(principal: Money, cash_flows: &'a [Money]) -> Self {
        NpvEvaluator {
            outflow: -principal.abs(),
            cash_flows,
            evaluations: 0,
            last_npv: Decimal::ZERO,
        }
    }

    fn failure(&self) -> FiscalError {
        FiscalError::ConvergenceFailure {
            function: "IRR".into(),
            iterations: self.evaluations,
            last_delta: self.last_npv,
        }
    }

    fn at(&mut self, rate: Decimal) -> FiscalResult<Decimal> {
        self.evaluations += 1;
        if self.evaluations > MAX_NPV_EVALUATIONS {
            debug!(rate = %rate, evaluations = self.evaluations, "IRR evaluation cap exceeded");
            return Err(self.failure());
        }

        let one_plus_r = Decimal::ONE + rate / dec!(100);
        if one_plus_r <= Decimal::ZERO {
            debug!(rate = %rate, "IRR search left the rate domain");
            return Err(self.failure());
        }

        let mut npv = self.outflow;
        let mut discount = Decimal::ONE;
        for cf in self.cash_flows {
            match discount.checked_mul(one_plus_r) {
                Some(d) => discount = d,
                None => break,
            }
            if cf.is_zero() {
                continue;
            }
            // Below 0% the discount shrinks toward zero and the terms grow
            match cf.checked_div(discount).and_then(|term| npv.checked_add(term)) {
                Some(sum) => npv = sum,
                None => {
                    debug!(rate = %rate, "IRR NPV left the decimal range");
                    self.last_npv = npv;
                    return Err(self.failure());
                }
            }
        }

        trace!(rate = %rate, npv = %npv, "IRR evaluation");
        self.last_npv = npv;
        Ok(npv)
    }
}

/// Rate at which an outflow of `principal` and the following `cash_flows`
/// (one per period, starting at period 1) have zero net present value.
///
/// `principal` is treated as an outflow regardless of its sign. The result
/// lies one basis point above the highest two-decimal rate, at or below the
/// coarse bracket, where NPV is still non-negative.
pub fn internal_rate_of_return(principal: Money, cash_flows: &[Money]) -> FiscalResult<Percent> {
    if cash_flows.is_empty() {
        return Err(FiscalError::InsufficientData(
            "IRR requires at least one cash flow after the principal".into(),
        ));
    }
    if principal.is_zero() {
        return Err(FiscalError::InvalidInput {
            field: "principal".into(),
            reason: "IRR requires a non-zero initial outflow".into(),
        });
    }

    let mut evaluator = NpvEvaluator::new(principal, cash_flows);
    let mut rate = START_RATE;

    while evaluator.at(rate)? > Decimal::ZERO {
        rate += COARSE_STEP;
    }
    debug!(upper = %rate, evaluations = evaluator.evaluations, "IRR bracketed");

    while evaluator.at(rate)? < Decimal::ZERO {
        rate -= FINE_STEP;
    }
    let found = round_cents(rate + FINE_STEP);

    debug!(rate = %found, evaluations = evaluator.evaluations, "IRR solved");
    Ok(Percent::new(found))
}
