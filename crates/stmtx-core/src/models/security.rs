//! Security (financial instrument) identity.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::engine::Context;
use crate::error::ExtractError;
use crate::values::currency_code;

/// Shared reference to a registered security.
pub type SecurityRef = Arc<Security>;

/// Registry-assigned identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SecurityId(pub u64);

/// A financial instrument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Security {
    /// Registry identifier.
    pub id: SecurityId,

    /// Instrument name.
    pub name: String,

    /// Exchange ticker symbol.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticker_symbol: Option<String>,

    /// Trading currency (ISO 4217).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency_code: Option<String>,

    /// International Securities Identification Number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isin: Option<String>,

    /// German securities identification number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wkn: Option<String>,

    /// Created by extraction rather than registered from an existing repository.
    #[serde(default)]
    pub extracted: bool,
}

/// Partial description of a security, as captured from a statement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecurityAttributes {
    pub name: Option<String>,
    /// Second half of a name that wrapped onto the next line.
    pub name_continued: Option<String>,
    pub ticker_symbol: Option<String>,
    pub currency_code: Option<String>,
    pub isin: Option<String>,
    pub wkn: Option<String>,
}

impl SecurityAttributes {
    /// Read the well-known capture keys from a context.
    ///
    /// `currency` holds a symbol or code and is mapped to an ISO code.
    pub fn from_context(context: &Context) -> Result<Self, ExtractError> {
        let currency_code = match context.get("currency") {
            Some(symbol) => Some(currency_code(symbol)?.to_string()),
            None => None,
        };

        Ok(Self {
            name: context.get("name").map(str::to_string),
            name_continued: context.get("nameContinued").map(str::to_string),
            ticker_symbol: context.get("tickerSymbol").map(str::to_string),
            currency_code,
            isin: context.get("isin").map(str::to_string),
            wkn: context.get("wkn").map(str::to_string),
        })
    }

    /// The name, joined with its continuation if present.
    pub fn full_name(&self) -> Option<String> {
        let name = self.name.as_deref().map(str::trim).filter(|s| !s.is_empty());
        let continued = self
            .name_continued
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());

        match (name, continued) {
            (Some(name), Some(continued)) => Some(format!("{} {}", name, continued)),
            (Some(name), None) => Some(name.to_string()),
            (None, Some(continued)) => Some(continued.to_string()),
            (None, None) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_name_joins_continuation() {
        let attrs = SecurityAttributes {
            name: Some("NXP SEMICONDUCTORS,".to_string()),
            name_continued: Some("N.V.".to_string()),
            ..Default::default()
        };
        assert_eq!(attrs.full_name().as_deref(), Some("NXP SEMICONDUCTORS, N.V."));
    }

    #[test]
    fn test_full_name_keeps_inner_spacing() {
        let attrs = SecurityAttributes {
            name: Some("NETAPP,  INC.".to_string()),
            ..Default::default()
        };
        assert_eq!(attrs.full_name().as_deref(), Some("NETAPP,  INC."));
    }

    #[test]
    fn test_from_context_maps_currency() {
        let mut context = Context::default();
        context.insert("name", "NETAPP,  INC.").unwrap();
        context.insert("tickerSymbol", "NTAP").unwrap();
        context.insert("currency", "$").unwrap();

        let attrs = SecurityAttributes::from_context(&context).unwrap();
        assert_eq!(attrs.currency_code.as_deref(), Some("USD"));
        assert_eq!(attrs.ticker_symbol.as_deref(), Some("NTAP"));
        assert_eq!(attrs.isin, None);
    }

    #[test]
    fn test_from_context_unknown_currency() {
        let mut context = Context::default();
        context.insert("currency", "¤").unwrap();
        assert!(SecurityAttributes::from_context(&context).is_err());
    }
}
