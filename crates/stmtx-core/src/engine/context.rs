//! Capture map shared by the sections of one block attempt.

use std::collections::BTreeMap;

use crate::error::{ExtractError, StepError};

/// Named captures of one attempt at running a pipeline over a block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context {
    values: BTreeMap<String, String>,
}

impl Context {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Like [`Context::get`], for keys an assign callback cannot do without.
    pub fn require(&self, key: &str) -> Result<&str, ExtractError> {
        self.get(key)
            .ok_or_else(|| ExtractError::MissingCapture(key.to_string()))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Set a capture. Re-setting a key to the same value is a no-op.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), StepError> {
        let key = key.into();
        let value = value.into();

        if let Some(existing) = self.values.get(&key) {
            if *existing != value {
                return Err(StepError::DuplicateCapture {
                    key,
                    existing: existing.clone(),
                    value,
                });
            }
            return Ok(());
        }

        self.values.insert(key, value);
        Ok(())
    }

    /// Merge all captures of `other`. Nothing is written unless every key is
    /// compatible.
    pub fn merge(&mut self, other: &Context) -> Result<(), StepError> {
        for (key, value) in &other.values {
            if let Some(existing) = self.values.get(key) {
                if existing != value {
                    return Err(StepError::DuplicateCapture {
                        key: key.clone(),
                        existing: existing.clone(),
                        value: value.clone(),
                    });
                }
            }
        }

        for (key, value) in &other.values {
            self.values
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_same_value_twice() {
        let mut context = Context::default();
        context.insert("currency", "$").unwrap();
        assert!(context.insert("currency", "$").is_ok());
        assert_eq!(context.len(), 1);
    }

    #[test]
    fn test_insert_conflict() {
        let mut context = Context::default();
        context.insert("currency", "$").unwrap();

        assert_eq!(
            context.insert("currency", "€"),
            Err(StepError::DuplicateCapture {
                key: "currency".to_string(),
                existing: "$".to_string(),
                value: "€".to_string(),
            })
        );
        assert_eq!(context.get("currency"), Some("$"));
    }

    #[test]
    fn test_merge_is_all_or_nothing() {
        let mut base = Context::default();
        base.insert("amount", "1.00").unwrap();

        let mut other = Context::default();
        other.insert("note", "hello").unwrap();
        other.insert("amount", "2.00").unwrap();

        assert!(base.merge(&other).is_err());
        assert!(!base.contains("note"));

        let mut compatible = Context::default();
        compatible.insert("amount", "1.00").unwrap();
        compatible.insert("note", "hello").unwrap();
        base.merge(&compatible).unwrap();
        assert_eq!(base.get("note"), Some("hello"));
    }

    #[test]
    fn test_require_missing() {
        let context = Context::default();
        assert_eq!(
            context.require("shares"),
            Err(ExtractError::MissingCapture("shares".to_string()))
        );
    }
}
