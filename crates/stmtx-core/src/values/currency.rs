//! Currency symbol to ISO 4217 code lookup.

use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::error::ValueError;

lazy_static! {
    static ref SYMBOLS: HashMap<&'static str, &'static str> = HashMap::from([
        ("$", "USD"),
        ("US$", "USD"),
        ("€", "EUR"),
        ("£", "GBP"),
        ("¥", "JPY"),
        ("₹", "INR"),
        ("₩", "KRW"),
        ("₽", "RUB"),
        ("₺", "TRY"),
        ("₪", "ILS"),
        ("zł", "PLN"),
        ("Fr.", "CHF"),
        ("kr", "SEK"),
        ("C$", "CAD"),
        ("A$", "AUD"),
    ]);
}

const CODES: [&str; 24] = [
    "AUD", "BRL", "CAD", "CHF", "CNY", "CZK", "DKK", "EUR", "GBP", "HKD", "HUF", "ILS", "INR",
    "JPY", "KRW", "MXN", "NOK", "NZD", "PLN", "RUB", "SEK", "SGD", "TRY", "USD",
];

/// Whether `code` is a supported ISO 4217 code.
pub fn is_known_currency(code: &str) -> bool {
    CODES.contains(&code)
}

/// Map a currency symbol (or an ISO code) to its ISO 4217 code.
pub fn currency_code(symbol: &str) -> Result<&'static str, ValueError> {
    let symbol = symbol.trim();

    if let Some(code) = SYMBOLS.get(symbol) {
        return Ok(*code);
    }

    CODES
        .iter()
        .find(|code| **code == symbol)
        .copied()
        .ok_or_else(|| ValueError::UnknownCurrencySymbol(symbol.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbols() {
        assert_eq!(currency_code("$"), Ok("USD"));
        assert_eq!(currency_code("€"), Ok("EUR"));
        assert_eq!(currency_code(" £ "), Ok("GBP"));
    }

    #[test]
    fn test_iso_codes_pass_through() {
        assert_eq!(currency_code("CHF"), Ok("CHF"));
        assert!(is_known_currency("USD"));
        assert!(!is_known_currency("usd"));
    }

    #[test]
    fn test_unknown_symbol() {
        assert_eq!(
            currency_code("¤"),
            Err(ValueError::UnknownCurrencySymbol("¤".to_string()))
        );
        assert!(currency_code("XYZ").is_err());
    }
}
