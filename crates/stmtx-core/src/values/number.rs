//! Locale-aware conversion of decimal strings into fixed-point integers.

use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::ValueError;

use super::{AMOUNT_SCALE, SHARE_SCALE};

/// Largest scale whose factor still fits an `i64`.
const MAX_SCALE: u32 = 18;

/// Grouping and decimal separators of a number format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Locale {
    /// Thousands separator.
    pub grouping: char,
    /// Decimal separator.
    pub decimal: char,
}

impl Locale {
    /// `1,234.56`
    pub const EN_US: Locale = Locale { grouping: ',', decimal: '.' };
    /// `1.234,56`
    pub const DE_DE: Locale = Locale { grouping: '.', decimal: ',' };
    /// `1'234.56`
    pub const DE_CH: Locale = Locale { grouping: '\'', decimal: '.' };
    /// `1 234,56`
    pub const FR_FR: Locale = Locale { grouping: ' ', decimal: ',' };

    fn is_grouping(&self, c: char) -> bool {
        // PDF converters emit a non-breaking space where a space groups digits
        c == self.grouping || (self.grouping == ' ' && c == '\u{00a0}')
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self::EN_US
    }
}

/// Parse `text` under `locale` into an integer of `scale` minor units.
///
/// "2,691.30" with [`Locale::EN_US`] and scale 2 is `269130`. Digits beyond
/// `scale` are rounded half away from zero.
pub fn parse_number(text: &str, locale: Locale, scale: u32) -> Result<i64, ValueError> {
    let malformed = || ValueError::MalformedNumber(text.to_string());

    if scale > MAX_SCALE {
        return Err(malformed());
    }

    let trimmed = text.trim();
    let (negative, body) = match trimmed.chars().next() {
        Some('-') => (true, &trimmed[1..]),
        Some('+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let mut normalized = String::with_capacity(body.len() + 1);
    let mut seen_decimal = false;
    let mut digits = 0usize;
    // Integer digit counts between grouping separators
    let mut groups: Vec<usize> = Vec::new();
    let mut group = 0usize;

    for c in body.chars() {
        if c.is_ascii_digit() {
            normalized.push(c);
            digits += 1;
            if !seen_decimal {
                group += 1;
            }
        } else if c == locale.decimal {
            if seen_decimal || !grouping_is_valid(&groups, group) {
                return Err(malformed());
            }
            seen_decimal = true;
            normalized.push('.');
        } else if locale.is_grouping(c) {
            if seen_decimal || group == 0 {
                return Err(malformed());
            }
            groups.push(group);
            group = 0;
        } else {
            return Err(malformed());
        }
    }

    if digits == 0 || (!seen_decimal && !grouping_is_valid(&groups, group)) {
        return Err(malformed());
    }
    if normalized.ends_with('.') {
        normalized.pop();
    }

    let value = Decimal::from_str(&normalized).map_err(|_| malformed())?;
    let factor = Decimal::from_i128_with_scale(10i128.pow(scale), 0);
    let scaled = value
        .checked_mul(factor)
        .ok_or_else(malformed)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);

    let minor = scaled.to_i64().ok_or_else(malformed)?;
    Ok(if negative { -minor } else { minor })
}

/// A leading group of one to three digits, then groups of exactly three.
fn grouping_is_valid(groups: &[usize], last: usize) -> bool {
    match groups.split_first() {
        None => true,
        Some((first, rest)) => (1..=3).contains(first) && rest.iter().all(|&g| g == 3) && last == 3,
    }
}

/// Parse a currency amount (scale 2).
pub fn as_amount(text: &str, locale: Locale) -> Result<i64, ValueError> {
    parse_number(text, locale, AMOUNT_SCALE)
}

/// Parse a share quantity (scale 8).
pub fn as_shares(text: &str, locale: Locale) -> Result<i64, ValueError> {
    parse_number(text, locale, SHARE_SCALE)
}

/// Convert minor units back into a decimal for display.
pub fn to_decimal(value: i64, scale: u32) -> Decimal {
    Decimal::new(value, scale)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_us_amounts() {
        assert_eq!(as_amount("2,691.30", Locale::EN_US), Ok(269130));
        assert_eq!(as_amount("959.31", Locale::EN_US), Ok(95931));
        assert_eq!(as_amount("0.00", Locale::EN_US), Ok(0));
        assert_eq!(as_amount("12", Locale::EN_US), Ok(1200));
    }

    #[test]
    fn test_parse_shares() {
        assert_eq!(as_shares("5.2350", Locale::EN_US), Ok(523_500_000));
        assert_eq!(as_shares("16", Locale::EN_US), Ok(1_600_000_000));
    }

    #[test]
    fn test_parse_other_locales() {
        assert_eq!(as_amount("1.234,56", Locale::DE_DE), Ok(123456));
        assert_eq!(as_amount("1'234.56", Locale::DE_CH), Ok(123456));
        assert_eq!(as_amount("1 234,56", Locale::FR_FR), Ok(123456));
        assert_eq!(as_amount("1\u{00a0}234,56", Locale::FR_FR), Ok(123456));
    }

    #[test]
    fn test_sign() {
        assert_eq!(as_amount("-12.50", Locale::EN_US), Ok(-1250));
        assert_eq!(as_amount("+12.50", Locale::EN_US), Ok(1250));
    }

    #[test]
    fn test_rounding_beyond_scale() {
        assert_eq!(as_amount("215.595", Locale::EN_US), Ok(21560));
        assert_eq!(as_amount("215.594", Locale::EN_US), Ok(21559));
        assert_eq!(as_amount("-0.005", Locale::EN_US), Ok(-1));
    }

    #[test]
    fn test_rejects_malformed() {
        for input in ["", "-", "abc", "$12.00", "1.2.3", "1.234,56", "--1", ",5", "5,", "1,2,3", "1,,234", "12,34.5"] {
            assert_eq!(
                as_amount(input, Locale::EN_US),
                Err(ValueError::MalformedNumber(input.to_string())),
                "input {:?}",
                input
            );
        }
    }

    #[test]
    fn test_grouping_positions() {
        assert_eq!(as_amount("1,234,567.89", Locale::EN_US), Ok(123456789));
        assert_eq!(as_amount("123,456", Locale::EN_US), Ok(12345600));
        assert_eq!(as_amount("1234567", Locale::EN_US), Ok(123456700));
        assert!(as_amount("1.23.456,00", Locale::DE_DE).is_err());
    }

    #[test]
    fn test_rejects_unrepresentable_scale() {
        assert_eq!(parse_number("0", Locale::EN_US, 18), Ok(0));
        for scale in [19, 30, 40, u32::MAX] {
            assert_eq!(
                parse_number("0", Locale::EN_US, scale),
                Err(ValueError::MalformedNumber("0".to_string())),
                "scale {}",
                scale
            );
        }
    }

    #[test]
    fn test_rejects_overflow() {
        assert!(as_shares("999999999999999", Locale::EN_US).is_err());
    }

    #[test]
    fn test_to_decimal() {
        assert_eq!(to_decimal(269130, 2).to_string(), "2691.30");
    }
}
