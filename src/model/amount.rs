//! Amount type for handling monetary values with optional currency symbols.
//!
//! This module provides the `Amount` type which wraps `Decimal` and handles parsing values that
//! may or may not include a currency symbol and thousands separators, e.g. `¥1,200`, `1,200円`,
//! `-$5.00` or plain `300`.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

/// A currency symbol that was found around the number when it was parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Symbol {
    Dollar,
    Yen,
    FullwidthYen,
    Euro,
    Pound,
    /// `円`, written after the number.
    En,
}

impl Symbol {
    fn from_prefix(c: char) -> Option<Self> {
        match c {
            '$' => Some(Symbol::Dollar),
            '¥' => Some(Symbol::Yen),
            '￥' => Some(Symbol::FullwidthYen),
            '€' => Some(Symbol::Euro),
            '£' => Some(Symbol::Pound),
            _ => None,
        }
    }

    fn glyph(&self) -> char {
        match self {
            Symbol::Dollar => '$',
            Symbol::Yen => '¥',
            Symbol::FullwidthYen => '￥',
            Symbol::Euro => '€',
            Symbol::Pound => '£',
            Symbol::En => '円',
        }
    }

    fn is_suffix(&self) -> bool {
        matches!(self, Symbol::En)
    }
}

/// Represents how amounts were (or should be) formatted.
///
/// # Examples
///  - `AmountFormat{ symbol: Some(Symbol::Yen), commas: true }` -> `-¥60,000`
///  - `AmountFormat{ symbol: Some(Symbol::En), commas: true }` -> `-60,000円`
///  - `AmountFormat{ symbol: None, commas: false }` -> `-60000`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AmountFormat {
    /// The currency symbol present in the formatting, if any.
    symbol: Option<Symbol>,
    /// Whether commas are present as thousands separators in the formatting.
    commas: bool,
}

impl Default for AmountFormat {
    fn default() -> Self {
        DEFAULT_FORMAT
    }
}

/// The default format has no symbol and uses commas: e.g. `-60,000`.
const DEFAULT_FORMAT: AmountFormat = AmountFormat {
    symbol: None,
    commas: true,
};

/// Represents a monetary amount. Negative values are refunds or corrections.
///
/// Formatting is considered significant for the purposes of equality, so for numeric comparisons,
/// you should access the `Decimal` value and use that.
///
/// # Examples
///
/// ```
/// # use kodukai::model::Amount;
/// # use std::str::FromStr;
/// let a = Amount::from_str("¥1,500").unwrap();
/// let b = Amount::from_str("1500円").unwrap();
/// assert_ne!(a, b);
/// assert_eq!(a.value(), b.value());
/// assert_eq!(a.to_string(), "¥1,500");
/// ```
///
/// An empty cell is not zero:
/// ```
/// # use kodukai::model::Amount;
/// # use std::str::FromStr;
/// assert!(Amount::from_str("").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount {
    /// The parsed numerical value.
    value: Decimal,
    /// The way the numerical value was parsed from, or should be written to, a `String`.
    format: AmountFormat,
}

impl Amount {
    /// Creates a new Amount from a Decimal value with default `String` formatting.
    pub const fn new(value: Decimal) -> Self {
        Self {
            value,
            format: DEFAULT_FORMAT,
        }
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.value
    }

    pub fn format(&self) -> AmountFormat {
        self.format
    }

    /// Returns true if the amount is negative, i.e. a refund or correction.
    pub fn is_negative(&self) -> bool {
        self.value.is_sign_negative() && !self.value.is_zero()
    }

    /// Returns true if the magnitude is at most `MAX_WHOLE_UNITS`.
    pub fn in_range(&self) -> bool {
        self.value.abs() <= Decimal::from(MAX_WHOLE_UNITS)
    }
}

/// The largest magnitude, in whole currency units, that an `Amount` may have. Sums of any
/// collection that fits in memory stay far below the `Decimal` limit.
pub const MAX_WHOLE_UNITS: i64 = 1_000_000_000_000_000;

/// An error that can occur when parsing strings into `Amount` values.
pub enum AmountError {
    /// Nothing was left after removing whitespace, symbols and separators.
    Empty,
    /// The remaining text is not a number.
    Invalid(rust_decimal::Error),
    /// A second sign was found after the first one, e.g. `--500` or `-¥-500`.
    ExtraSign,
    /// The magnitude is larger than `MAX_WHOLE_UNITS`.
    OutOfRange,
}

impl Debug for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AmountError::Empty => f.write_str("Empty"),
            AmountError::Invalid(e) => Debug::fmt(e, f),
            AmountError::ExtraSign => f.write_str("ExtraSign"),
            AmountError::OutOfRange => f.write_str("OutOfRange"),
        }
    }
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AmountError::Empty => f.write_str("the amount is empty"),
            AmountError::Invalid(e) => Display::fmt(e, f),
            AmountError::ExtraSign => f.write_str("the amount has more than one sign"),
            AmountError::OutOfRange => write!(
                f,
                "the amount is larger than {MAX_WHOLE_UNITS} in magnitude"
            ),
        }
    }
}

impl Error for AmountError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AmountError::Invalid(e) => Some(e),
            _ => None,
        }
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut symbol = None;
        let mut negative = false;
        let mut signed = true;

        let mut rest = s.trim();
        if let Some(after_minus) = rest.strip_prefix('-') {
            negative = true;
            rest = after_minus.trim_start();
        } else if let Some(after_plus) = rest.strip_prefix('+') {
            rest = after_plus.trim_start();
        } else {
            signed = false;
        }

        // Prefix symbol, e.g. "¥300" or "-$50.00"
        if let Some(found) = rest.chars().next().and_then(Symbol::from_prefix) {
            symbol = Some(found);
            rest = rest[found.glyph().len_utf8()..].trim_start();
            // The sign may also follow the symbol: "$-50.00"
            if !signed {
                if let Some(after_minus) = rest.strip_prefix('-') {
                    negative = true;
                    rest = after_minus.trim_start();
                }
            }
        }

        // At most one sign
        if rest.starts_with(['-', '+']) {
            return Err(AmountError::ExtraSign);
        }

        // Suffix symbol, e.g. "300円"
        if symbol.is_none() {
            if let Some(before) = rest.strip_suffix(Symbol::En.glyph()) {
                symbol = Some(Symbol::En);
                rest = before.trim_end();
            }
        }

        let without_commas = rest.replace(',', "");
        let commas = without_commas.len() < rest.len();
        if without_commas.is_empty() {
            return Err(AmountError::Empty);
        }

        let value = Decimal::from_str(&without_commas)
            .or_else(|_| Decimal::from_scientific(&without_commas))
            .map_err(AmountError::Invalid)?;
        let value = if negative && !value.is_zero() {
            -value
        } else {
            value
        };

        let amount = Amount {
            value,
            format: AmountFormat { symbol, commas },
        };
        if !amount.in_range() {
            return Err(AmountError::OutOfRange);
        }
        Ok(amount)
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        let digits = self.value.abs().to_string();
        let num = if self.format.commas {
            group_thousands(&digits)
        } else {
            digits
        };
        match self.format.symbol {
            Some(symbol) if symbol.is_suffix() => write!(f, "{sign}{num}{}", symbol.glyph()),
            Some(symbol) => write!(f, "{sign}{}{num}", symbol.glyph()),
            None => write!(f, "{sign}{num}"),
        }
    }
}

/// Inserts a comma every three digits of the integer part of an unsigned decimal string.
fn group_thousands(digits: &str) -> String {
    let (int, frac) = match digits.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (digits, None),
    };
    let mut grouped = String::with_capacity(int.len() + int.len() / 3 + 1);
    for (ix, c) in int.chars().enumerate() {
        if ix > 0 && (int.len() - ix) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if let Some(frac) = frac {
        grouped.push('.');
        grouped.push_str(frac);
    }
    grouped
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Amount::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}
