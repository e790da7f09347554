//! Helpers shared by issuer pipelines.

use tracing::warn;

use crate::engine::Context;
use crate::error::ExtractError;
use crate::models::transaction::{Money, TransactionDraft, UnitType};
use crate::values::{as_amount, currency_code, Locale};

/// Read `currency` and `tax` from `context` and add them as a tax unit.
pub fn process_tax_entries<K>(
    draft: &mut TransactionDraft<K>,
    context: &Context,
    locale: Locale,
    document_type: &str,
) -> Result<(), ExtractError> {
    let tax = read_money(context, "tax", locale)?;
    check_and_set_tax(draft, tax, document_type);
    Ok(())
}

/// Read `currency` and `fee` from `context` and add them as a fee unit.
pub fn process_fee_entries<K>(
    draft: &mut TransactionDraft<K>,
    context: &Context,
    locale: Locale,
    document_type: &str,
) -> Result<(), ExtractError> {
    let fee = read_money(context, "fee", locale)?;
    check_and_set_fee(draft, fee, document_type);
    Ok(())
}

/// Add `tax` to the draft unless it is zero or in a foreign currency.
pub fn check_and_set_tax<K>(draft: &mut TransactionDraft<K>, tax: Money, document_type: &str) {
    check_and_set(draft, UnitType::Tax, tax, document_type);
}

/// Add `fee` to the draft unless it is zero or in a foreign currency.
pub fn check_and_set_fee<K>(draft: &mut TransactionDraft<K>, fee: Money, document_type: &str) {
    check_and_set(draft, UnitType::Fee, fee, document_type);
}

fn check_and_set<K>(draft: &mut TransactionDraft<K>, kind: UnitType, money: Money, document_type: &str) {
    if money.is_zero() {
        return;
    }

    match draft.currency_code.as_deref() {
        Some(code) if code != money.currency_code => {
            warn!(
                "{}: ignoring {:?} of {} in transaction currency {}",
                document_type, kind, money, code
            );
        }
        _ => draft.add_unit(kind, money),
    }
}

fn read_money(context: &Context, key: &str, locale: Locale) -> Result<Money, ExtractError> {
    let currency = currency_code(context.require("currency")?)?;
    let amount = as_amount(context.require(key)?, locale)?;
    Ok(Money::new(currency, amount))
}

#[cfg(test)]
mod tests {
    use crate::models::transaction::PortfolioTransactionType;

    use super::*;

    fn draft() -> TransactionDraft<PortfolioTransactionType> {
        let mut draft = TransactionDraft::new(PortfolioTransactionType::DeliveryInbound);
        draft.currency_code = Some("USD".to_string());
        draft.amount = Some(95931);
        draft
    }

    fn context(pairs: &[(&str, &str)]) -> Context {
        let mut context = Context::default();
        for (key, value) in pairs {
            context.insert(*key, *value).unwrap();
        }
        context
    }

    #[test]
    fn test_tax_entry_added() {
        let mut draft = draft();
        process_tax_entries(
            &mut draft,
            &context(&[("currency", "$"), ("tax", "356.66")]),
            Locale::EN_US,
            "Purchase Summary",
        )
        .unwrap();

        assert_eq!(draft.units.len(), 1);
        assert_eq!(draft.units[0].kind, UnitType::Tax);
        assert_eq!(draft.units[0].amount, Money::new("USD", 35666));
    }

    #[test]
    fn test_zero_fee_ignored() {
        let mut draft = draft();
        process_fee_entries(
            &mut draft,
            &context(&[("currency", "$"), ("fee", "0.00")]),
            Locale::EN_US,
            "Purchase Summary",
        )
        .unwrap();
        assert!(draft.units.is_empty());
    }

    #[test]
    fn test_foreign_currency_ignored() {
        let mut draft = draft();
        check_and_set_tax(&mut draft, Money::new("EUR", 100), "Purchase Summary");
        assert!(draft.units.is_empty());

        check_and_set_fee(&mut draft, Money::new("USD", 100), "Purchase Summary");
        assert_eq!(draft.units.len(), 1);
    }

    #[test]
    fn test_missing_capture_is_an_error() {
        let mut draft = draft();
        let err = process_fee_entries(
            &mut draft,
            &context(&[("currency", "$"), ("tax", "1.00")]),
            Locale::EN_US,
            "Purchase Summary",
        )
        .unwrap_err();
        assert_eq!(err, ExtractError::MissingCapture("fee".to_string()));
    }
}
