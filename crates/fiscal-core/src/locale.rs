//! Locale conventions for currency formatting.
//!
//! Covers the locales this library renders: grouping and decimal separators,
//! symbol placement, and the symbol a currency takes in a given region.

use rust_decimal::{Decimal, RoundingStrategy};
use tracing::trace;

use crate::error::FiscalError;
use crate::types::CurrencyCode;
use crate::FiscalResult;

const NBSP: &str = "\u{a0}";
const NARROW_NBSP: &str = "\u{202f}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SymbolPlacement {
    /// `$123.45`
    Prefix,
    /// `123,45 €`, separated by a no-break space
    Suffix,
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) struct LocaleConventions {
    tag: &'static str,
    region: &'static str,
    group_separator: &'static str,
    decimal_separator: &'static str,
    placement: SymbolPlacement,
}

static EN_US: LocaleConventions = LocaleConventions {
    tag: "en-US",
    region: "US",
    group_separator: ",",
    decimal_separator: ".",
    placement: SymbolPlacement::Prefix,
};

static EN_GB: LocaleConventions = LocaleConventions {
    tag: "en-GB",
    region: "GB",
    group_separator: ",",
    decimal_separator: ".",
    placement: SymbolPlacement::Prefix,
};

static EN_CA: LocaleConventions = LocaleConventions {
    tag: "en-CA",
    region: "CA",
    group_separator: ",",
    decimal_separator: ".",
    placement: SymbolPlacement::Prefix,
};

static DE_DE: LocaleConventions = LocaleConventions {
    tag: "de-DE",
    region: "DE",
    group_separator: ".",
    decimal_separator: ",",
    placement: SymbolPlacement::Suffix,
};

static FR_FR: LocaleConventions = LocaleConventions {
    tag: "fr-FR",
    region: "FR",
    group_separator: NARROW_NBSP,
    decimal_separator: ",",
    placement: SymbolPlacement::Suffix,
};

static JA_JP: LocaleConventions = LocaleConventions {
    tag: "ja-JP",
    region: "JP",
    group_separator: ",",
    decimal_separator: ".",
    placement: SymbolPlacement::Prefix,
};

/// Resolve a BCP 47 style tag (`en-US`, `de`, `fr_FR`) to its conventions.
pub(crate) fn resolve(language_code: &str) -> FiscalResult<&'static LocaleConventions> {
    let normalized = language_code.trim().replace('_', "-");
    let mut parts = normalized.split('-');
    let language = parts.next().unwrap_or_default().to_ascii_lowercase();
    let region = parts.next().map(|r| r.to_ascii_uppercase());

    let conventions = match (language.as_str(), region.as_deref()) {
        ("en", None | Some("US")) => &EN_US,
        ("en", Some("GB")) => &EN_GB,
        ("en", Some("CA")) => &EN_CA,
        ("de", None | Some("DE")) => &DE_DE,
        ("fr", None | Some("FR")) => &FR_FR,
        ("ja", None | Some("JP")) => &JA_JP,
        _ => {
            return Err(FiscalError::InvalidInput {
                field: "language_code".into(),
                reason: format!("Unsupported locale '{language_code}'"),
            })
        }
    };
    Ok(conventions)
}

/// Symbol a currency displays with in the locale's region, if it has one.
fn symbol(code: &CurrencyCode, region: &str) -> Option<&'static str> {
    use CurrencyCode::*;
    let sym = match (region, code) {
        (_, EUR) => "€",
        ("US", USD) | ("DE", USD) | ("JP", USD) | ("CA", CAD) => "$",
        ("GB", USD) | ("CA", USD) => "US$",
        ("FR", USD) => "$US",
        ("FR", GBP) => "£GB",
        (_, GBP) => "£",
        ("US", JPY) | ("DE", JPY) => "¥",
        ("JP", JPY) => "￥",
        ("GB", JPY) | ("CA", JPY) => "JP¥",
        ("FR", CAD) => "$CA",
        (_, CAD) => "CA$",
        ("DE", AUD) => "AU$",
        ("US", AUD) | ("GB", AUD) | ("CA", AUD) | ("JP", AUD) => "A$",
        ("US", HKD) | ("GB", HKD) | ("CA", HKD) | ("DE", HKD) | ("JP", HKD) => "HK$",
        _ => return None,
    };
    Some(sym)
}

/// Insert `separator` between every group of three integer digits.
fn group_digits(integer: &str, separator: &str) -> String {
    let digits: Vec<char> = integer.chars().collect();
    let mut out = String::with_capacity(integer.len() + integer.len() / 3 * separator.len());
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push_str(separator);
        }
        out.push(*c);
    }
    out
}

/// Format `amount` as currency in the given locale.
pub(crate) fn format_currency(
    amount: Decimal,
    code: &CurrencyCode,
    language_code: &str,
) -> FiscalResult<String> {
    let conventions = resolve(language_code)?;
    let units = code.minor_units();
    let rounded = amount.round_dp_with_strategy(units, RoundingStrategy::MidpointAwayFromZero);

    let plain = format!("{:.*}", units as usize, rounded.abs());
    let (integer, fraction) = match plain.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (plain.as_str(), None),
    };
    let mut number = group_digits(integer, conventions.group_separator);
    if let Some(f) = fraction {
        number.push_str(conventions.decimal_separator);
        number.push_str(f);
    }

    // Sign of the unrounded amount, so small debts still read as debts
    let sign = if amount.is_sign_negative() && !amount.is_zero() {
        "-"
    } else {
        ""
    };

    let formatted = match (conventions.placement, symbol(code, conventions.region)) {
        (SymbolPlacement::Prefix, Some(sym)) => format!("{sign}{sym}{number}"),
        (SymbolPlacement::Prefix, None) => format!("{sign}{}{NBSP}{number}", code.code()),
        (SymbolPlacement::Suffix, Some(sym)) => format!("{sign}{number}{NBSP}{sym}"),
        (SymbolPlacement::Suffix, None) => format!("{sign}{number}{NBSP}{}", code.code()),
    };
    trace!(locale = conventions.tag, %code, %amount, %formatted, "formatted currency");
    Ok(formatted)
}
