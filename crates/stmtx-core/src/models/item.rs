//! Output items of an extraction run.

use serde::Serialize;

use super::security::SecurityRef;
use super::transaction::{AccountTransaction, PortfolioTransaction};

/// One extracted record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "item", rename_all = "snake_case")]
pub enum Item {
    /// A security created during extraction.
    Security(SecurityRef),
    PortfolioTransaction(PortfolioTransaction),
    AccountTransaction(AccountTransaction),
}

impl Item {
    /// The security a transaction refers to.
    pub fn security(&self) -> Option<&SecurityRef> {
        match self {
            Item::Security(security) => Some(security),
            Item::PortfolioTransaction(tx) => Some(&tx.security),
            Item::AccountTransaction(tx) => tx.security.as_ref(),
        }
    }

    /// Stamp the originating document on a transaction.
    pub fn set_source(&mut self, source: &str) {
        match self {
            Item::Security(_) => {}
            Item::PortfolioTransaction(tx) => tx.source = source.to_string(),
            Item::AccountTransaction(tx) => tx.source = source.to_string(),
        }
    }

    pub fn is_transaction(&self) -> bool {
        !matches!(self, Item::Security(_))
    }

    /// Short label for summaries.
    pub fn label(&self) -> &'static str {
        match self {
            Item::Security(_) => "security",
            Item::PortfolioTransaction(_) => "portfolio_transaction",
            Item::AccountTransaction(_) => "account_transaction",
        }
    }
}
