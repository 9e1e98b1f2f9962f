pub mod amortization;
pub mod error;
pub mod fiscal;
pub mod irr;
mod locale;
pub mod returns;
pub mod time_value;
pub mod types;

#[cfg(feature = "valuation")]
pub mod valuation;

#[cfg(feature = "credit")]
pub mod credit;

#[cfg(feature = "income")]
pub mod income;

pub use amortization::{Amortization, AmortizationRow, LoanTerm, PeriodUnit};
pub use error::FiscalError;
pub use fiscal::Fiscal;
pub use types::*;

/// Standard result type for all fiscal operations
pub type FiscalResult<T> = Result<T, FiscalError>;
