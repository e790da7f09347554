//! E*TRADE employee stock plan confirmations.
//!
//! Purchase (ESPP) and exercise confirmations are booked as inbound
//! deliveries at the total price paid. Taxes and fees are recorded as
//! informational units.

use std::sync::Arc;

use crate::engine::{Block, Context, DocumentType, Fingerprint, Issuer, Section, Transaction};
use crate::error::ExtractError;
use crate::models::item::Item;
use crate::models::security::SecurityAttributes;
use crate::models::transaction::{PortfolioTransactionType, TransactionDraft};
use crate::registry::SecurityRegistry;
use crate::values::{as_amount, as_shares, currency_code, parse_date, DateFormat, Locale};
use crate::Result;

use super::common::{process_fee_entries, process_tax_entries};

/// Issuer label, also the literal identifying its documents.
pub const LABEL: &str = "E*TRADE Securities LLC";

const PURCHASE_SUMMARY: &str = "Purchase Summary";

const TICKER: &str = r"[A-Z0-9]{1,6}(?:\.[A-Z]{1,4})?";

const LOCALE: Locale = Locale::EN_US;

type Draft = TransactionDraft<PortfolioTransactionType>;

pub fn issuer(registry: Arc<SecurityRegistry>) -> Result<Issuer> {
    Ok(Issuer::new(LABEL)
        .identified_by(Fingerprint::literal(LABEL))
        .add_document_type(purchase_summary(registry)?))
}

fn purchase_summary(registry: Arc<SecurityRegistry>) -> Result<DocumentType> {
    let transaction = Transaction::new(|| Draft::new(PortfolioTransactionType::DeliveryInbound))
        .one_of(security_sections(registry)?)
        .one_of(vec![
            // N.V.(NXPI) Shares Purchased 5.2350
            Section::new(&["shares"])
                .match_line(r".* Shares Purchased (?<shares>[\.,\d]+)")?
                .assign(|t: &mut Draft, v| {
                    t.shares = Some(as_shares(v.require("shares")?, LOCALE)?);
                    Ok(())
                }),
            // Shares Issued 16
            Section::new(&["shares"])
                .match_line(r"Shares Issued (?<shares>[\.,\d]+)")?
                .assign(|t: &mut Draft, v| {
                    t.shares = Some(as_shares(v.require("shares")?, LOCALE)?);
                    Ok(())
                }),
        ])
        .one_of(vec![
            // Purchase Date 02-28-2025
            Section::new(&["date"])
                .match_line(r"Purchase Date (?<date>\d{2}-\d{2}-\d{4})( .*)?")?
                .assign(|t: &mut Draft, v| {
                    t.date_time = Some(parse_date(v.require("date")?, DateFormat::MonthDayYearDash)?);
                    Ok(())
                }),
            // Exercise Date: 04/14/2025 Exercise Type: Cash Exercise Registration:
            Section::new(&["date"])
                .match_line(r"Exercise Date: (?<date>\d{2}/\d{2}/\d{4})( .*)?")?
                .assign(|t: &mut Draft, v| {
                    t.date_time = Some(parse_date(v.require("date")?, DateFormat::MonthDayYearSlash)?);
                    Ok(())
                }),
        ])
        // Total Price ($959.31)
        .section(
            Section::new(&["currency", "amount"])
                .match_line(r"Total Price \((?<currency>\p{Sc})(?<amount>[\.,\d]+)\)")?
                .assign(|t: &mut Draft, v| {
                    t.currency_code = Some(currency_code(v.require("currency")?)?.to_string());
                    t.amount = Some(as_amount(v.require("amount")?, LOCALE)?);
                    Ok(())
                }),
        )
        // Taxable Gain $169.30
        .section(
            Section::new(&["note"])
                .optional()
                .match_line(r"(?<note>Taxable Gain .*)")?
                .assign(|t: &mut Draft, v| {
                    t.note = Some(v.require("note")?.trim().to_string());
                    Ok(())
                }),
        )
        // Taxes Withheld ($356.66) (Tax Rate / Taxable Gain)
        .section(
            Section::new(&["currency", "tax"])
                .optional()
                .match_line(r"Taxes Withheld \(?(?<currency>\p{Sc})(?<tax>[\.,\d]+)\)?( .*)?")?
                .assign(|t: &mut Draft, v| process_tax_entries(t, v, LOCALE, PURCHASE_SUMMARY)),
        )
        // Comission/Fee ($0.00)
        .section(
            Section::new(&["currency", "fee"])
                .optional()
                .match_line(r"Comission/Fee \(?(?<currency>\p{Sc})(?<fee>[\.,\d]+)\)?( .*)?")?
                .assign(|t: &mut Draft, v| process_fee_entries(t, v, LOCALE, PURCHASE_SUMMARY)),
        )
        .wrap(|t: Draft| Ok(Some(Item::PortfolioTransaction(t.try_into()?))));

    Ok(DocumentType::new(PURCHASE_SUMMARY, PURCHASE_SUMMARY)?
        .add_block(Block::new(r"^EMPLOYEE STOCK PLAN (EXERCISE|PURCHASE) CONFIRMATION$", transaction)?))
}

fn security_sections(registry: Arc<SecurityRegistry>) -> Result<Vec<Section<Draft>>> {
    let single_line_purchase = format!(
        r"Company Name \(Symbol\) (?<name>.*)\((?<tickerSymbol>{})\) Beginning Balance .*",
        TICKER
    );
    let continued_purchase = format!(
        r"(?<nameContinued>.*)\((?<tickerSymbol>{})\) Shares Purchased [\.,\d]+",
        TICKER
    );
    let single_line_exercise = format!(
        r"Company Name \(Symbol\) (?<name>.*)\((?<tickerSymbol>{})\) Broker Assist Fee .*",
        TICKER
    );
    let continued_exercise = format!(
        r"(?<nameContinued>.*)\((?<tickerSymbol>{})\) Disbursement Fee.*",
        TICKER
    );

    Ok(vec![
        // Company Name (Symbol) NETAPP,  INC.(NTAP) Beginning Balance 60.0000
        // Grant Date Market Value $71.960000
        Section::new(&["name", "tickerSymbol", "currency"])
            .match_line(&single_line_purchase)?
            .match_line(r"Grant Date Market Value (?<currency>\p{Sc})[\.,\d]+")?
            .assign(resolve_security(&registry)),
        // Company Name (Symbol) NXP SEMICONDUCTORS, Beginning Balance 0.0000
        // N.V.(NXPI) Shares Purchased 5.2350
        // Grant Date Market Value $215.590000
        Section::new(&["name", "nameContinued", "tickerSymbol", "currency"])
            .match_lines(&[
                r"Company Name \(Symbol\) (?<name>.*) Beginning Balance .*",
                continued_purchase.as_str(),
            ])?
            .match_line(r"Grant Date Market Value (?<currency>\p{Sc})[\.,\d]+")?
            .assign(resolve_security(&registry)),
        // Company Name (Symbol) NETAPP,  INC.(NTAP) Broker Assist Fee ($0.00)
        // Exercise Market Value $83.28
        Section::new(&["name", "tickerSymbol", "currency"])
            .match_line(&single_line_exercise)?
            .match_line(r"Exercise Market Value (?<currency>\p{Sc})[\.,\d]+")?
            .assign(resolve_security(&registry)),
        // Company Name (Symbol) NXP SEMICONDUCTORS, Broker Assist Fee ($0.00)
        // N.V.(NXPI) Disbursement Fee ($0.00)
        // Exercise Market Value $123.45
        Section::new(&["name", "nameContinued", "tickerSymbol", "currency"])
            .match_lines(&[
                r"Company Name \(Symbol\) (?<name>.*) Broker Assist Fee .*",
                continued_exercise.as_str(),
            ])?
            .match_line(r"Exercise Market Value (?<currency>\p{Sc})[\.,\d]+")?
            .assign(resolve_security(&registry)),
    ])
}

fn resolve_security(
    registry: &Arc<SecurityRegistry>,
) -> impl Fn(&mut Draft, &Context) -> std::result::Result<(), ExtractError> + Send + Sync + 'static {
    let registry = Arc::clone(registry);
    move |t: &mut Draft, v: &Context| {
        t.security = Some(registry.resolve(&SecurityAttributes::from_context(v)?));
        Ok(())
    }
}
