use std::fmt;
use std::str::FromStr;

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::FiscalError;
use crate::locale;
use crate::FiscalResult;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%). Never as percentages.
pub type Rate = Decimal;

/// Round a produced amount or percentage to two decimal places, halves away from zero.
pub(crate) fn round_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Convert a floating-point input, rejecting NaN and infinities.
pub fn decimal_from_f64(field: &str, value: f64) -> FiscalResult<Decimal> {
    if !value.is_finite() {
        return Err(FiscalError::InvalidInput {
            field: field.into(),
            reason: format!("Value must be finite, got {value}"),
        });
    }
    Decimal::from_f64(value).ok_or_else(|| FiscalError::InvalidInput {
        field: field.into(),
        reason: format!("Value {value} is outside the representable decimal range"),
    })
}

// ---------------------------------------------------------------------------
// Currency codes and formatting options
// ---------------------------------------------------------------------------

/// ISO 4217 currency code
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CurrencyCode {
    GBP,
    #[default]
    USD,
    EUR,
    CHF,
    JPY,
    CAD,
    AUD,
    HKD,
    SGD,
    Other(String),
}

impl CurrencyCode {
    pub fn code(&self) -> &str {
        match self {
            CurrencyCode::GBP => "GBP",
            CurrencyCode::USD => "USD",
            CurrencyCode::EUR => "EUR",
            CurrencyCode::CHF => "CHF",
            CurrencyCode::JPY => "JPY",
            CurrencyCode::CAD => "CAD",
            CurrencyCode::AUD => "AUD",
            CurrencyCode::HKD => "HKD",
            CurrencyCode::SGD => "SGD",
            CurrencyCode::Other(code) => code,
        }
    }

    /// Number of fraction digits shown when formatting.
    pub fn minor_units(&self) -> u32 {
        match self {
            CurrencyCode::JPY => 0,
            _ => 2,
        }
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for CurrencyCode {
    type Err = FiscalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_uppercase();
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(FiscalError::InvalidInput {
                field: "currency_code".into(),
                reason: format!("'{s}' is not a three-letter ISO 4217 code"),
            });
        }
        Ok(match code.as_str() {
            "GBP" => CurrencyCode::GBP,
            "USD" => CurrencyCode::USD,
            "EUR" => CurrencyCode::EUR,
            "CHF" => CurrencyCode::CHF,
            "JPY" => CurrencyCode::JPY,
            "CAD" => CurrencyCode::CAD,
            "AUD" => CurrencyCode::AUD,
            "HKD" => CurrencyCode::HKD,
            "SGD" => CurrencyCode::SGD,
            _ => CurrencyCode::Other(code),
        })
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = FiscalError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.code().to_string()
    }
}

/// Currency and locale applied to every produced `Currency`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatOptions {
    #[serde(default)]
    pub currency_code: CurrencyCode,
    #[serde(default = "default_language_code")]
    pub language_code: String,
}

fn default_language_code() -> String {
    "en-US".to_string()
}

impl Default for FormatOptions {
    fn default() -> Self {
        FormatOptions {
            currency_code: CurrencyCode::default(),
            language_code: default_language_code(),
        }
    }
}

impl FormatOptions {
    pub fn new(currency_code: CurrencyCode, language_code: impl Into<String>) -> Self {
        FormatOptions {
            currency_code,
            language_code: language_code.into(),
        }
    }

    /// Parse options from a JSON document such as
    /// `{"currency_code": "EUR", "language_code": "de-DE"}`.
    ///
    /// Missing keys fall back to the defaults; an unsupported locale is rejected.
    pub fn from_json(json: &str) -> FiscalResult<Self> {
        let options: FormatOptions = serde_json::from_str(json)?;
        locale::resolve(&options.language_code)?;
        Ok(options)
    }
}

// ---------------------------------------------------------------------------
// Percent
// ---------------------------------------------------------------------------

/// A percentage value: `Percent::new(dec!(10))` is 10%.
///
/// The stored value is always the percentage, never the fraction. No
/// validation happens here; producers decide the displayed precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Percent(Decimal);

impl Percent {
    pub fn new(value: Decimal) -> Self {
        Percent(value)
    }

    /// Build from a decimal fraction (0.1 becomes 10%).
    pub fn from_decimal(rate: Rate) -> Self {
        Percent(rate * dec!(100))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn as_decimal(&self) -> Rate {
        self.0 / dec!(100)
    }

    pub fn as_string(&self) -> String {
        format!("{}%", self.0.normalize())
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_string())
    }
}

impl From<Decimal> for Percent {
    fn from(value: Decimal) -> Self {
        Percent(value)
    }
}

impl TryFrom<f64> for Percent {
    type Error = FiscalError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        decimal_from_f64("percent", value).map(Percent)
    }
}

// ---------------------------------------------------------------------------
// Currency
// ---------------------------------------------------------------------------

/// A monetary amount together with the options used to format it.
///
/// The amount is kept exactly as produced; `Currency` formats but never
/// re-rounds the stored value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    amount: Money,
    options: FormatOptions,
}

impl Currency {
    pub fn new(amount: Money) -> Self {
        Currency {
            amount,
            options: FormatOptions::default(),
        }
    }

    pub fn with_options(amount: Money, options: FormatOptions) -> Self {
        Currency { amount, options }
    }

    pub fn options(&self) -> &FormatOptions {
        &self.options
    }

    pub fn as_number(&self) -> Money {
        self.amount
    }

    /// Two decimal places, no separators or symbol.
    pub fn as_string(&self) -> String {
        format!("{:.2}", round_cents(self.amount))
    }

    /// Locale-aware rendering such as `$123,456.79` or `123.456,79 €`.
    ///
    /// Either argument overrides the options captured at construction.
    pub fn as_formatted_string(
        &self,
        currency_code: Option<&CurrencyCode>,
        language_code: Option<&str>,
    ) -> FiscalResult<String> {
        let code = currency_code.unwrap_or(&self.options.currency_code);
        let language = language_code.unwrap_or(&self.options.language_code);
        locale::format_currency(self.amount, code, language)
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_string())
    }
}

impl TryFrom<f64> for Currency {
    type Error = FiscalError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        decimal_from_f64("amount", value).map(Currency::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_percent_as_string() {
        assert_eq!(Percent::new(dec!(10)).as_string(), "10%");
        assert_eq!(Percent::new(dec!(225.530)).as_string(), "225.53%");
        assert_eq!(Percent::new(dec!(2.00)).to_string(), "2%");
    }

    #[test]
    fn test_percent_as_decimal() {
        assert_eq!(Percent::new(dec!(10)).as_decimal(), dec!(0.1));
        assert_eq!(Percent::from_decimal(dec!(0.075)).value(), dec!(7.5));
    }

    #[test]
    fn test_percent_accepts_negative_values() {
        let p = Percent::new(dec!(-3.5));
        assert_eq!(p.as_decimal(), dec!(-0.035));
        assert_eq!(p.as_string(), "-3.5%");
    }

    #[test]
    fn test_non_finite_floats_rejected() {
        assert!(Percent::try_from(f64::NAN).is_err());
        assert!(Currency::try_from(f64::INFINITY).is_err());
        let c = Currency::try_from(12.5).unwrap();
        assert_eq!(c.as_number(), dec!(12.5));
    }

    #[test]
    fn test_currency_as_string_two_decimals() {
        assert_eq!(Currency::new(dec!(80525.5)).as_string(), "80525.50");
        assert_eq!(Currency::new(dec!(123456.789)).as_string(), "123456.79");
        assert_eq!(Currency::new(dec!(-0.125)).as_string(), "-0.13");
    }

    #[test]
    fn test_currency_keeps_full_precision() {
        let c = Currency::new(dec!(123456.789));
        assert_eq!(c.as_number(), dec!(123456.789));
    }

    #[test]
    fn test_currency_code_parse() {
        assert_eq!("eur".parse::<CurrencyCode>().unwrap(), CurrencyCode::EUR);
        assert_eq!(
            "nok".parse::<CurrencyCode>().unwrap(),
            CurrencyCode::Other("NOK".into())
        );
        assert!("EURO".parse::<CurrencyCode>().is_err());
        assert!("U1D".parse::<CurrencyCode>().is_err());
    }

    #[test]
    fn test_format_options_from_json() {
        let opts =
            FormatOptions::from_json(r#"{"currency_code": "EUR", "language_code": "de-DE"}"#)
                .unwrap();
        assert_eq!(opts, FormatOptions::new(CurrencyCode::EUR, "de-DE"));

        let defaults = FormatOptions::from_json("{}").unwrap();
        assert_eq!(defaults, FormatOptions::default());
    }

    #[test]
    fn test_format_options_from_json_rejects_bad_input() {
        assert!(matches!(
            FormatOptions::from_json("not json"),
            Err(FiscalError::SerializationError(_))
        ));
        assert!(matches!(
            FormatOptions::from_json(r#"{"language_code": "xx-YY"}"#),
            Err(FiscalError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_format_options_serialize_code_as_string() {
        let json = serde_json::to_string(&FormatOptions::default()).unwrap();
        assert_eq!(json, r#"{"currency_code":"USD","language_code":"en-US"}"#);
    }
}
