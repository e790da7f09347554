//! Sections: step sequences with an assign callback.

use std::ops::Range;

use crate::error::{ExtractError, StepError};

use super::step::{match_step, Step};
use super::Context;

/// Callback copying captured values onto the target record.
pub type Assign<T> = Box<dyn Fn(&mut T, &Context) -> Result<(), ExtractError> + Send + Sync>;

/// An ordered list of steps, the attributes they must capture, and the
/// callback that applies them to the target record.
pub struct Section<T> {
    attributes: Vec<String>,
    steps: Vec<Step>,
    optional: bool,
    assign: Option<Assign<T>>,
}

impl<T> Section<T> {
    /// A section that must capture every name in `attributes`.
    pub fn new(attributes: &[&str]) -> Self {
        Self {
            attributes: attributes.iter().map(|a| a.to_string()).collect(),
            steps: Vec::new(),
            optional: false,
            assign: None,
        }
    }

    /// Skip the section instead of failing the block when it does not match.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// Append a single-line step, searched for from the previous step's end.
    pub fn match_line(self, pattern: &str) -> Result<Self, regex::Error> {
        Ok(self.step(Step::line(pattern)?))
    }

    /// Append a step spanning consecutive lines.
    pub fn match_lines(self, patterns: &[&str]) -> Result<Self, regex::Error> {
        Ok(self.step(Step::lines(patterns)?))
    }

    /// Append a single-line step that must match right after the previous one.
    pub fn match_next(self, pattern: &str) -> Result<Self, regex::Error> {
        Ok(self.step(Step::line(pattern)?.adjacent()))
    }

    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    pub fn assign<F>(mut self, assign: F) -> Self
    where
        F: Fn(&mut T, &Context) -> Result<(), ExtractError> + Send + Sync + 'static,
    {
        self.assign = Some(Box::new(assign));
        self
    }

    /// Run the steps over `range`, starting at its first line.
    ///
    /// Returns `attempt` extended with this section's captures; `attempt`
    /// itself is never modified.
    pub(crate) fn try_match(
        &self,
        lines: &[String],
        range: Range<usize>,
        attempt: &Context,
    ) -> Result<Context, StepError> {
        let mut captured = Context::default();
        let mut cursor = range.start;

        for step in &self.steps {
            cursor = match_step(lines, cursor, range.end, step, &mut captured)?;
        }

        if let Some(missing) = self.attributes.iter().find(|a| !captured.contains(a)) {
            return Err(StepError::MissingAttribute(missing.clone()));
        }

        let mut merged = attempt.clone();
        merged.merge(&captured)?;
        Ok(merged)
    }

    pub(crate) fn apply(&self, target: &mut T, context: &Context) -> Result<(), ExtractError> {
        match &self.assign {
            Some(assign) => assign(target, context),
            None => Ok(()),
        }
    }

    /// Check the section is well formed: it has steps, and each declared
    /// attribute is a capture group of one of them.
    pub(crate) fn check(&self) -> Result<(), ExtractError> {
        if self.steps.is_empty() {
            return Err(ExtractError::Pipeline(format!(
                "section {:?} has no steps",
                self.attributes
            )));
        }

        if self.steps.iter().any(|s| s.line_count() == 0) {
            return Err(ExtractError::Pipeline(format!(
                "section {:?} has a step without patterns",
                self.attributes
            )));
        }

        for attribute in &self.attributes {
            if !self
                .steps
                .iter()
                .any(|s| s.capture_names().any(|name| name == attribute.as_str()))
            {
                return Err(ExtractError::Pipeline(format!(
                    "attribute `{}` is not captured by any step",
                    attribute
                )));
            }
        }
        Ok(())
    }
}
