//! Field types for VeriPay transactions.
//!
//! Each type owns exactly one canonical text form. Parsing is strict,
//! formatting is total, and `parse(format(x)) == x` for every value, so the
//! signer and the verifier cannot drift apart on how a field is spelled.

use chrono::{DateTime, Datelike, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::value::RawValue;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::config::{CURRENCY_CODE_LENGTH, MAX_AMOUNT_SCALE, MAX_REMARK_LENGTH, TIMESTAMP_FORMAT};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Field-level validation failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// A required field was never set.
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    /// The currency is not three uppercase ASCII letters.
    #[error("unsupported currency code: {code:?}")]
    InvalidCurrency { code: String },

    /// The amount text is not a plain decimal number.
    #[error("malformed amount: {input:?}")]
    MalformedAmount { input: String },

    /// The amount has more digits than the exact representation can hold.
    #[error("amount out of range: {input:?}")]
    AmountOutOfRange { input: String },

    /// The amount is zero.
    #[error("amount must be > 0")]
    NonPositiveAmount,

    /// The remark exceeds the QR-friendly length limit.
    #[error("remark is {len} bytes (max allowed: {max})")]
    RemarkTooLong { len: usize, max: usize },

    /// The timestamp is not in `YYYY-MM-DDTHH:MM:SS.mmmZ` form.
    #[error("non-canonical timestamp: {input:?}")]
    NonCanonicalTimestamp { input: String },

    /// The timestamp's year has no four-digit spelling.
    #[error("timestamp year {year} outside 0000-9999")]
    TimestampOutOfRange { year: i32 },
}

// ---------------------------------------------------------------------------
// CurrencyCode
// ---------------------------------------------------------------------------

/// A three-letter uppercase currency code such as `USD` or `BRL`.
///
/// The protocol does not keep a list of "real" currencies; the shape is
/// all it checks. Which codes a terminal accepts is business logic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Validates and wraps a currency code.
    pub fn new(code: &str) -> Result<Self, FieldError> {
        let well_formed = code.len() == CURRENCY_CODE_LENGTH
            && code.bytes().all(|b| b.is_ascii_uppercase());
        if !well_formed {
            return Err(FieldError::InvalidCurrency {
                code: code.to_string(),
            });
        }
        Ok(Self(code.to_string()))
    }

    /// The code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for CurrencyCode {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = FieldError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Amount
// ---------------------------------------------------------------------------

/// An exact, non-negative decimal amount.
///
/// Stored as an integer count of `10^-scale` units. Values are normalized
/// on construction (trailing fractional zeros stripped), so `10.20` and
/// `10.2` are the same `Amount` and print identically.
///
/// # Examples
///
/// ```
/// use veripay_protocol::transaction::Amount;
///
/// let amount: Amount = "10.20".parse().unwrap();
/// assert_eq!(amount.to_string(), "10.2");
/// assert_eq!(amount.units(), 102);
/// assert_eq!(amount.scale(), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Amount {
    units: u64,
    scale: u8,
}

impl Amount {
    /// Builds an amount from `units * 10^-scale`, normalizing the result.
    pub fn from_units(units: u64, scale: u8) -> Result<Self, FieldError> {
        let (mut units, mut scale) = (units, scale);
        while scale > 0 && units % 10 == 0 {
            units /= 10;
            scale -= 1;
        }
        if scale > MAX_AMOUNT_SCALE {
            return Err(FieldError::AmountOutOfRange {
                input: format!("{}e-{}", units, scale),
            });
        }
        Ok(Self { units, scale })
    }

    /// Integer count of the smallest unit at [`scale`](Self::scale).
    pub fn units(&self) -> u64 {
        self.units
    }

    /// Number of fractional digits.
    pub fn scale(&self) -> u8 {
        self.scale
    }

    /// Returns `true` if the amount is greater than zero.
    pub fn is_positive(&self) -> bool {
        self.units > 0
    }
}

impl FromStr for Amount {
    type Err = FieldError;

    /// Parses `digits[.digits]`. No sign, no exponent, no whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || FieldError::MalformedAmount {
            input: s.to_string(),
        };
        let (whole, frac) = match s.split_once('.') {
            Some((whole, frac)) => (whole, frac),
            None => (s, ""),
        };
        if whole.is_empty() || (s.contains('.') && frac.is_empty()) {
            return Err(malformed());
        }
        if !whole.bytes().chain(frac.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }

        // Trailing fractional zeros carry no value; drop them before they
        // can overflow the accumulator.
        let frac = frac.trim_end_matches('0');
        if frac.len() > MAX_AMOUNT_SCALE as usize {
            return Err(FieldError::AmountOutOfRange {
                input: s.to_string(),
            });
        }

        let mut units: u64 = 0;
        for digit in whole.bytes().chain(frac.bytes()) {
            units = units
                .checked_mul(10)
                .and_then(|u| u.checked_add(u64::from(digit - b'0')))
                .ok_or_else(|| FieldError::AmountOutOfRange {
                    input: s.to_string(),
                })?;
        }

        Self::from_units(units, frac.len() as u8)
    }
}

impl fmt::Display for Amount {
    /// Canonical text: shortest exact decimal, no exponent, no trailing zeros.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scale == 0 {
            return write!(f, "{}", self.units);
        }
        let scale = self.scale as usize;
        let digits = format!("{:0>width$}", self.units, width = scale + 1);
        let (whole, frac) = digits.split_at(digits.len() - scale);
        write!(f, "{}.{}", whole, frac)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Amount {
    /// Accepts the canonical string form, or a JSON number for payloads
    /// produced by tools that emit amounts numerically.
    ///
    /// Numbers are parsed from their exact source text, never through a
    /// float, so `12345678901234567.5` stays `12345678901234567.5`. Number
    /// spellings the strict grammar refuses (`1e3`, `-1`) are errors.
    ///
    /// Only `serde_json` deserializers can supply the source text; any
    /// other deserializer is refused.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Box::<RawValue>::deserialize(deserializer)?;
        let source = raw.get();
        let text = if source.starts_with('"') {
            serde_json::from_str::<String>(source).map_err(serde::de::Error::custom)?
        } else {
            source.to_string()
        };
        text.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Remark
// ---------------------------------------------------------------------------

/// Checks the remark length limit.
pub(crate) fn validate_remark(remark: &str) -> Result<(), FieldError> {
    if remark.len() > MAX_REMARK_LENGTH {
        return Err(FieldError::RemarkTooLong {
            len: remark.len(),
            max: MAX_REMARK_LENGTH,
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Timestamps
// ---------------------------------------------------------------------------

/// Years with a four-digit `%Y` spelling. Anything else formats with a
/// sign and cannot be parsed back.
pub const TIMESTAMP_YEARS: std::ops::RangeInclusive<i32> = 0..=9999;

/// Checks that `at` has a canonical text form.
pub(crate) fn validate_timestamp(at: &DateTime<Utc>) -> Result<(), FieldError> {
    if !TIMESTAMP_YEARS.contains(&at.year()) {
        return Err(FieldError::TimestampOutOfRange { year: at.year() });
    }
    Ok(())
}

/// Truncates to the millisecond precision the wire format carries.
pub fn truncate_to_millis(at: DateTime<Utc>) -> DateTime<Utc> {
    at.trunc_subsecs(3)
}

/// Formats a timestamp as `YYYY-MM-DDTHH:MM:SS.mmmZ`.
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Parses a timestamp, accepting only the exact canonical spelling.
///
/// Any RFC 3339 variant that would re-format differently (offsets other
/// than `Z`, missing or extra fractional digits) is rejected, so a payload
/// can never carry two spellings of the same signed instant.
pub fn parse_timestamp(input: &str) -> Result<DateTime<Utc>, FieldError> {
    let non_canonical = || FieldError::NonCanonicalTimestamp {
        input: input.to_string(),
    };
    let parsed = DateTime::parse_from_rfc3339(input)
        .map_err(|_| non_canonical())?
        .with_timezone(&Utc);
    if format_timestamp(&parsed) != input {
        return Err(non_canonical());
    }
    Ok(parsed)
}

/// Serde adapter for canonical `created_at` values.
pub(crate) mod timestamp {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_timestamp(at))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let text = String::deserialize(deserializer)?;
        super::parse_timestamp(&text).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
