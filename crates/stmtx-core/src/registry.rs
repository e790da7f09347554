//! Idempotent lookup-or-create of securities.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

use crate::models::security::{Security, SecurityAttributes, SecurityId, SecurityRef};

/// Registry of securities shared by every pipeline of an extraction run.
///
/// Lookup order is ISIN, WKN, ticker + currency, then normalized name +
/// currency. `resolve` holds the lock for the whole lookup-or-insert.
#[derive(Debug, Default)]
pub struct SecurityRegistry {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    securities: Vec<SecurityRef>,
    by_isin: HashMap<String, usize>,
    by_wkn: HashMap<String, usize>,
    by_ticker: HashMap<(String, Option<String>), usize>,
    by_name: HashMap<(String, Option<String>), usize>,
}

impl Inner {
    fn find(&self, attrs: &SecurityAttributes) -> Option<usize> {
        if let Some(index) = attrs.isin.as_deref().and_then(|isin| self.by_isin.get(isin)) {
            return Some(*index);
        }
        if let Some(index) = attrs.wkn.as_deref().and_then(|wkn| self.by_wkn.get(wkn)) {
            return Some(*index);
        }
        if let Some(ticker) = attrs.ticker_symbol.as_deref() {
            let key = (ticker.trim().to_string(), attrs.currency_code.clone());
            if let Some(index) = self.by_ticker.get(&key) {
                return Some(*index);
            }
        }
        attrs
            .full_name()
            .and_then(|name| self.by_name.get(&(normalize_name(&name), attrs.currency_code.clone())))
            .copied()
    }

    fn insert(&mut self, security: Security) -> SecurityRef {
        let index = self.securities.len();

        if let Some(isin) = &security.isin {
            self.by_isin.entry(isin.clone()).or_insert(index);
        }
        if let Some(wkn) = &security.wkn {
            self.by_wkn.entry(wkn.clone()).or_insert(index);
        }
        if let Some(ticker) = &security.ticker_symbol {
            self.by_ticker
                .entry((ticker.clone(), security.currency_code.clone()))
                .or_insert(index);
        }
        self.by_name
            .entry((normalize_name(&security.name), security.currency_code.clone()))
            .or_insert(index);

        let security = Arc::new(security);
        self.securities.push(Arc::clone(&security));
        security
    }

    fn next_id(&self) -> SecurityId {
        SecurityId(self.securities.len() as u64 + 1)
    }
}

impl SecurityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Return the security matching `attrs`, creating it if none does.
    pub fn resolve(&self, attrs: &SecurityAttributes) -> SecurityRef {
        let mut inner = self.lock();

        if let Some(index) = inner.find(attrs) {
            return Arc::clone(&inner.securities[index]);
        }

        let name = attrs
            .full_name()
            .or_else(|| attrs.ticker_symbol.clone())
            .or_else(|| attrs.isin.clone())
            .or_else(|| attrs.wkn.clone())
            .unwrap_or_default();

        let security = Security {
            id: inner.next_id(),
            name,
            ticker_symbol: attrs.ticker_symbol.as_deref().map(|s| s.trim().to_string()),
            currency_code: attrs.currency_code.clone(),
            isin: attrs.isin.clone(),
            wkn: attrs.wkn.clone(),
            extracted: true,
        };

        debug!(
            "Registering new security {:?} ({})",
            security.name,
            security.ticker_symbol.as_deref().unwrap_or("-")
        );

        inner.insert(security)
    }

    /// Add a security known before extraction, e.g. from a repository.
    ///
    /// The registry assigns the id; the security is not marked as extracted.
    pub fn register(&self, mut security: Security) -> SecurityRef {
        let mut inner = self.lock();
        security.id = inner.next_id();
        security.extracted = false;
        inner.insert(security)
    }

    pub fn len(&self) -> usize {
        self.lock().securities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of every registered security, in registration order.
    pub fn securities(&self) -> Vec<SecurityRef> {
        self.lock().securities.clone()
    }
}

fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
