//! Block pipelines: sections and alternations feeding one target record.

use std::ops::Range;

use tracing::{debug, trace};

use crate::error::{ExtractError, StepError};
use crate::models::item::Item;

use super::block::BlockPipeline;
use super::section::Section;
use super::Context;

type Subject<T> = Box<dyn Fn() -> T + Send + Sync>;
type Wrap<T> = Box<dyn Fn(T) -> Result<Option<Item>, ExtractError> + Send + Sync>;

enum Link<T> {
    Section(Section<T>),
    OneOf {
        alternatives: Vec<Section<T>>,
        optional: bool,
    },
}

/// A declared pipeline turning one block into at most one item.
///
/// ```ignore
/// Transaction::new(|| TransactionDraft::new(PortfolioTransactionType::DeliveryInbound))
///     .one_of(vec![security_a, security_b])
///     .section(total_price)
///     .section(note.optional())
///     .wrap(|t| Ok(Some(Item::PortfolioTransaction(t.try_into()?))))
/// ```
///
/// Links run in declaration order; `wrap` always runs last, even when
/// sections are appended after it.
pub struct Transaction<T> {
    subject: Subject<T>,
    links: Vec<Link<T>>,
    wrap: Option<Wrap<T>>,
}

impl<T> Transaction<T> {
    /// Start a pipeline whose target records are built by `subject`.
    pub fn new<F>(subject: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self {
            subject: Box::new(subject),
            links: Vec::new(),
            wrap: None,
        }
    }

    pub fn section(mut self, section: Section<T>) -> Self {
        self.links.push(Link::Section(section));
        self
    }

    /// First alternative whose steps all match wins. Fails the block if none
    /// does.
    pub fn one_of(mut self, alternatives: Vec<Section<T>>) -> Self {
        self.links.push(Link::OneOf {
            alternatives,
            optional: false,
        });
        self
    }

    /// Like [`Transaction::one_of`], but skipped when no alternative matches.
    pub fn optional_one_of(mut self, alternatives: Vec<Section<T>>) -> Self {
        self.links.push(Link::OneOf {
            alternatives,
            optional: true,
        });
        self
    }

    /// Convert the finished target into an item. `Ok(None)` drops it.
    pub fn wrap<F>(mut self, wrap: F) -> Self
    where
        F: Fn(T) -> Result<Option<Item>, ExtractError> + Send + Sync + 'static,
    {
        self.wrap = Some(Box::new(wrap));
        self
    }

    /// Number of sections and alternations.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Run the pipeline over `range` of `lines`.
    pub fn parse(&self, lines: &[String], range: Range<usize>) -> Result<Option<Item>, ExtractError> {
        let wrap = self
            .wrap
            .as_ref()
            .ok_or_else(|| ExtractError::Pipeline("transaction has no wrap step".to_string()))?;

        let mut target = (self.subject)();
        let mut context = Context::default();

        for (index, link) in self.links.iter().enumerate() {
            match link {
                Link::Section(section) => {
                    match section.try_match(lines, range.clone(), &context) {
                        Ok(merged) => {
                            section.apply(&mut target, &merged)?;
                            context = merged;
                        }
                        Err(reason) if section.is_optional() => {
                            debug!("Skipping optional section {}: {}", index, reason);
                        }
                        Err(reason) => {
                            return Err(ExtractError::SectionMatchFailed {
                                section: index,
                                reason,
                            });
                        }
                    }
                }
                Link::OneOf {
                    alternatives,
                    optional,
                } => {
                    let mut last_reason = None;
                    let mut matched = false;

                    for (alternative, section) in alternatives.iter().enumerate() {
                        match section.try_match(lines, range.clone(), &context) {
                            Ok(merged) => {
                                debug!("Section {} matched alternative {}", index, alternative);
                                section.apply(&mut target, &merged)?;
                                context = merged;
                                matched = true;
                                break;
                            }
                            Err(reason) => {
                                trace!("Section {} alternative {}: {}", index, alternative, reason);
                                last_reason = Some(reason);
                            }
                        }
                    }

                    if !matched {
                        if *optional {
                            debug!("Skipping optional alternation {}", index);
                        } else {
                            return Err(ExtractError::SectionMatchFailed {
                                section: index,
                                reason: last_reason.unwrap_or(StepError::NoMatch {
                                    pattern: "<no alternatives>".to_string(),
                                    line: range.start,
                                }),
                            });
                        }
                    }
                }
            }
        }

        wrap(target)
    }

    /// Validate every section of the pipeline.
    pub fn check(&self) -> Result<(), ExtractError> {
        if self.wrap.is_none() {
            return Err(ExtractError::Pipeline("transaction has no wrap step".to_string()));
        }

        for link in &self.links {
            match link {
                Link::Section(section) => section.check()?,
                Link::OneOf { alternatives, .. } => {
                    if alternatives.is_empty() {
                        return Err(ExtractError::Pipeline("empty alternation".to_string()));
                    }
                    for section in alternatives {
                        section.check()?;
                    }
                }
            }
        }
        Ok(())
    }
}

impl<T> BlockPipeline for Transaction<T> {
    fn parse(&self, lines: &[String], range: Range<usize>) -> Result<Option<Item>, ExtractError> {
        Transaction::parse(self, lines, range)
    }

    fn check(&self) -> Result<(), ExtractError> {
        Transaction::check(self)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use chrono::NaiveDate;

    use crate::models::transaction::{AccountTransactionType, TransactionDraft};
    use crate::values::{as_amount, Locale};

    use super::*;

    type Draft = TransactionDraft<AccountTransactionType>;

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(str::to_string).collect()
    }

    fn date_section() -> Section<Draft> {
        Section::new(&["date"])
            .match_line(r"Date (?<date>\d{4}-\d{2}-\d{2})")
            .unwrap()
            .assign(|t: &mut Draft, v| {
                t.date_time = Some(crate::values::parse_date(
                    v.require("date")?,
                    crate::values::DateFormat::Iso,
                )?);
                Ok(())
            })
    }

    fn amount_section() -> Section<Draft> {
        Section::new(&["currency", "amount"])
            .match_line(r"Amount (?<currency>[A-Z]{3}) (?<amount>[\.,\d]+)")
            .unwrap()
            .assign(|t: &mut Draft, v| {
                t.currency_code = Some(v.require("currency")?.to_string());
                t.amount = Some(as_amount(v.require("amount")?, Locale::EN_US)?);
                Ok(())
            })
    }

    fn pipeline() -> Transaction<Draft> {
        Transaction::new(|| TransactionDraft::new(AccountTransactionType::Dividends))
            .section(date_section())
            .section(amount_section())
            .section(
                Section::new(&["note"])
                    .optional()
                    .match_line(r"(?<note>Record date .*)")
                    .unwrap()
                    .assign(|t: &mut Draft, v| {
                        t.note = Some(v.require("note")?.trim().to_string());
                        Ok(())
                    }),
            )
            .wrap(|t| Ok(Some(Item::AccountTransaction(t.try_into()?))))
    }

    #[test]
    fn test_full_match() {
        let lines = lines("Dividend\nDate 2025-03-14\nAmount USD 12.34\nRecord date 2025-03-01");
        let item = pipeline().parse(&lines, 0..4).unwrap().unwrap();

        let Item::AccountTransaction(tx) = item else {
            panic!("expected account transaction");
        };
        assert_eq!(
            tx.date_time,
            NaiveDate::from_ymd_opt(2025, 3, 14).unwrap().and_hms_opt(0, 0, 0).unwrap()
        );
        assert_eq!(tx.amount.amount, 1234);
        assert_eq!(tx.note.as_deref(), Some("Record date 2025-03-01"));
    }

    #[test]
    fn test_optional_section_skipped() {
        let lines = lines("Date 2025-03-14\nAmount USD 12.34");
        let item = pipeline().parse(&lines, 0..2).unwrap().unwrap();

        let Item::AccountTransaction(tx) = item else {
            panic!("expected account transaction");
        };
        assert_eq!(tx.note, None);
    }

    #[test]
    fn test_mandatory_section_fails_block() {
        let lines = lines("Date 2025-03-14\nno amount here");
        let err = pipeline().parse(&lines, 0..2).unwrap_err();

        assert!(matches!(
            err,
            ExtractError::SectionMatchFailed { section: 1, .. }
        ));
    }

    #[test]
    fn test_malformed_value_fails_block() {
        let lines = lines("Date 2025-03-14\nAmount USD 1.2.3");
        let err = pipeline().parse(&lines, 0..2).unwrap_err();
        assert!(matches!(err, ExtractError::Value(_)));
    }

    fn recording(label: &'static str, log: Arc<Mutex<Vec<&'static str>>>) -> Section<Draft> {
        Section::new(&["amount"])
            .match_line(r"Amount (?<amount>.*)")
            .unwrap()
            .assign(move |_, _| {
                log.lock().unwrap().push(label);
                Ok(())
            })
    }

    #[test]
    fn test_one_of_prefers_declaration_order() {
        let lines = lines("Amount USD 1.00");

        for (order, expected) in [(["first", "second"], "first"), (["second", "first"], "second")] {
            let log = Arc::new(Mutex::new(Vec::new()));
            let pipeline = Transaction::new(|| TransactionDraft::new(AccountTransactionType::Fees))
                .one_of(vec![
                    recording(order[0], Arc::clone(&log)),
                    recording(order[1], Arc::clone(&log)),
                ])
                .wrap(|_| Ok(None));

            assert_eq!(pipeline.parse(&lines, 0..1), Ok(None));
            assert_eq!(*log.lock().unwrap(), vec![expected]);
        }
    }

    #[test]
    fn test_one_of_alternatives_use_fresh_snapshot() {
        // the first alternative captures `currency` before failing on its
        // second step; the second alternative must not see it
        let lines = lines("Amount EUR 5.00\nDate 2025-01-01");
        let first = Section::<Draft>::new(&["currency", "amount"])
            .match_line(r"Amount (?<currency>[A-Z]{2}).*")
            .unwrap()
            .match_line(r"Missing (?<amount>.*)")
            .unwrap();

        let pipeline = Transaction::new(|| TransactionDraft::new(AccountTransactionType::Fees))
            .one_of(vec![first, amount_section()])
            .section(date_section())
            .wrap(|t| Ok(Some(Item::AccountTransaction(t.try_into()?))));

        let item = pipeline.parse(&lines, 0..2).unwrap().unwrap();
        let Item::AccountTransaction(tx) = item else {
            panic!("expected account transaction");
        };
        assert_eq!(tx.amount.currency_code, "EUR");
        assert_eq!(tx.amount.amount, 500);
    }

    #[test]
    fn test_one_of_without_match() {
        let lines = lines("nothing");
        let pipeline = Transaction::new(|| TransactionDraft::new(AccountTransactionType::Fees))
            .one_of(vec![amount_section()])
            .wrap(|_| Ok(None));
        assert!(matches!(
            pipeline.parse(&lines, 0..1),
            Err(ExtractError::SectionMatchFailed { section: 0, .. })
        ));

        let optional = Transaction::new(|| TransactionDraft::new(AccountTransactionType::Fees))
            .optional_one_of(vec![amount_section()])
            .wrap(|_| Ok(None));
        assert_eq!(optional.parse(&lines, 0..1), Ok(None));
    }

    #[test]
    fn test_missing_wrap() {
        let pipeline = Transaction::new(|| TransactionDraft::new(AccountTransactionType::Fees))
            .section(amount_section());
        assert!(pipeline.check().is_err());
        assert!(matches!(
            pipeline.parse(&lines("Amount USD 1.00"), 0..1),
            Err(ExtractError::Pipeline(_))
        ));
    }
}
