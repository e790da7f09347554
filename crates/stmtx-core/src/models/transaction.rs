//! Transaction records produced by extraction.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::ExtractError;
use crate::values::{to_decimal, AMOUNT_SCALE, SHARE_SCALE};

use super::security::SecurityRef;

/// An amount of money in minor units.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    /// ISO 4217 currency code.
    pub currency_code: String,
    /// Amount in minor units (scale 2).
    pub amount: i64,
}

impl Money {
    pub fn new(currency_code: impl Into<String>, amount: i64) -> Self {
        Self {
            currency_code: currency_code.into(),
            amount,
        }
    }

    pub fn zero(currency_code: impl Into<String>) -> Self {
        Self::new(currency_code, 0)
    }

    pub fn is_zero(&self) -> bool {
        self.amount == 0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.currency_code, to_decimal(self.amount, AMOUNT_SCALE))
    }
}

/// Kind of a transaction unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitType {
    /// Gross value, when it differs from the booked amount.
    GrossValue,
    /// Withheld tax.
    Tax,
    /// Fee or commission.
    Fee,
}

/// A component of a transaction amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub kind: UnitType,
    pub amount: Money,
}

/// Portfolio (depot) transaction types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortfolioTransactionType {
    Buy,
    Sell,
    TransferIn,
    TransferOut,
    DeliveryInbound,
    DeliveryOutbound,
}

/// Cash account transaction types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountTransactionType {
    Deposit,
    Removal,
    Interest,
    InterestCharge,
    Dividends,
    Fees,
    FeesRefund,
    Taxes,
    TaxRefund,
    Buy,
    Sell,
    TransferIn,
    TransferOut,
}

/// In-progress transaction assembled by a block pipeline.
///
/// Every field stays optional until the wrap step, which checks that the
/// fields its item needs are present.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionDraft<K> {
    pub kind: K,
    pub security: Option<SecurityRef>,
    pub date_time: Option<NaiveDateTime>,
    /// Share quantity (scale 8).
    pub shares: Option<i64>,
    pub currency_code: Option<String>,
    /// Booked amount (scale 2).
    pub amount: Option<i64>,
    pub units: Vec<Unit>,
    pub note: Option<String>,
}

impl<K> TransactionDraft<K> {
    pub fn new(kind: K) -> Self {
        Self {
            kind,
            security: None,
            date_time: None,
            shares: None,
            currency_code: None,
            amount: None,
            units: Vec::new(),
            note: None,
        }
    }

    /// The booked amount as money, once both currency and amount are known.
    pub fn money(&self) -> Option<Money> {
        match (&self.currency_code, self.amount) {
            (Some(code), Some(amount)) => Some(Money::new(code.clone(), amount)),
            _ => None,
        }
    }

    pub fn add_unit(&mut self, kind: UnitType, amount: Money) {
        self.units.push(Unit { kind, amount });
    }

    fn sum_units(&self, kind: UnitType) -> i64 {
        self.units
            .iter()
            .filter(|u| u.kind == kind)
            .map(|u| u.amount.amount)
            .sum()
    }

    fn require_money(&self) -> Result<(String, i64), ExtractError> {
        let currency_code = self
            .currency_code
            .clone()
            .ok_or_else(|| ExtractError::MissingField("currency".to_string()))?;
        let amount = self
            .amount
            .ok_or_else(|| ExtractError::MissingField("amount".to_string()))?;
        Ok((currency_code, amount))
    }

    fn totals(&self, currency_code: &str, amount: i64) -> Totals {
        let gross = self
            .units
            .iter()
            .find(|u| u.kind == UnitType::GrossValue)
            .map(|u| u.amount.amount)
            .unwrap_or(amount);

        Totals {
            gross_value: Money::new(currency_code, gross),
            taxes: Money::new(currency_code, self.sum_units(UnitType::Tax)),
            fees: Money::new(currency_code, self.sum_units(UnitType::Fee)),
        }
    }
}

struct Totals {
    gross_value: Money,
    taxes: Money,
    fees: Money,
}

/// A completed portfolio transaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioTransaction {
    #[serde(rename = "type")]
    pub kind: PortfolioTransactionType,
    pub security: SecurityRef,
    pub date_time: NaiveDateTime,
    /// Share quantity (scale 8).
    pub shares: i64,
    pub amount: Money,
    pub gross_value: Money,
    pub taxes: Money,
    pub fees: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Identifier of the document this was extracted from.
    pub source: String,
}

impl PortfolioTransaction {
    /// Shares as a decimal quantity.
    pub fn shares_decimal(&self) -> rust_decimal::Decimal {
        to_decimal(self.shares, SHARE_SCALE)
    }
}

impl TryFrom<TransactionDraft<PortfolioTransactionType>> for PortfolioTransaction {
    type Error = ExtractError;

    fn try_from(draft: TransactionDraft<PortfolioTransactionType>) -> Result<Self, Self::Error> {
        let (currency_code, amount) = draft.require_money()?;
        let totals = draft.totals(&currency_code, amount);

        Ok(Self {
            kind: draft.kind,
            security: draft
                .security
                .ok_or_else(|| ExtractError::MissingField("security".to_string()))?,
            date_time: draft
                .date_time
                .ok_or_else(|| ExtractError::MissingField("date".to_string()))?,
            shares: draft
                .shares
                .ok_or_else(|| ExtractError::MissingField("shares".to_string()))?,
            amount: Money::new(currency_code, amount),
            gross_value: totals.gross_value,
            taxes: totals.taxes,
            fees: totals.fees,
            note: draft.note,
            source: String::new(),
        })
    }
}

/// A completed cash account transaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountTransaction {
    #[serde(rename = "type")]
    pub kind: AccountTransactionType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<SecurityRef>,
    pub date_time: NaiveDateTime,
    /// Share quantity (scale 8), zero when no security is involved.
    pub shares: i64,
    pub amount: Money,
    pub gross_value: Money,
    pub taxes: Money,
    pub fees: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub source: String,
}

impl TryFrom<TransactionDraft<AccountTransactionType>> for AccountTransaction {
    type Error = ExtractError;

    fn try_from(draft: TransactionDraft<AccountTransactionType>) -> Result<Self, Self::Error> {
        let (currency_code, amount) = draft.require_money()?;
        let totals = draft.totals(&currency_code, amount);

        Ok(Self {
            kind: draft.kind,
            security: draft.security,
            date_time: draft
                .date_time
                .ok_or_else(|| ExtractError::MissingField("date".to_string()))?,
            shares: draft.shares.unwrap_or(0),
            amount: Money::new(currency_code, amount),
            gross_value: totals.gross_value,
            taxes: totals.taxes,
            fees: totals.fees,
            note: draft.note,
            source: String::new(),
        })
    }
}
