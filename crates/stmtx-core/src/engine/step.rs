//! Line-level pattern matching.

use regex::Regex;

use crate::error::StepError;

use super::Context;

/// Compile `pattern` so that it must match a whole line.
pub fn anchored(pattern: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!("^(?:{})$", pattern))
}

/// One or more patterns matched against consecutive lines.
#[derive(Debug, Clone)]
pub struct Step {
    patterns: Vec<Regex>,
    adjacent: bool,
}

impl Step {
    /// A single-line step.
    pub fn line(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            patterns: vec![anchored(pattern)?],
            adjacent: false,
        })
    }

    /// A multi-line step: the patterns must match directly consecutive lines.
    pub fn lines(patterns: &[&str]) -> Result<Self, regex::Error> {
        let patterns = patterns
            .iter()
            .map(|p| anchored(p))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            patterns,
            adjacent: false,
        })
    }

    /// Require the step to match at the cursor instead of scanning ahead.
    pub fn adjacent(mut self) -> Self {
        self.adjacent = true;
        self
    }

    /// Number of lines the step consumes.
    pub fn line_count(&self) -> usize {
        self.patterns.len()
    }

    /// Names of every capture group the step can write.
    pub fn capture_names(&self) -> impl Iterator<Item = &str> {
        self.patterns
            .iter()
            .flat_map(|p| p.capture_names().flatten())
    }

    fn describe(&self) -> String {
        self.patterns
            .iter()
            .map(Regex::as_str)
            .collect::<Vec<_>>()
            .join(" / ")
    }

    /// Match the step at `start`, collecting its captures.
    fn captures_at(&self, lines: &[String], start: usize) -> Option<Result<Context, StepError>> {
        let mut captured = Context::default();

        for (offset, pattern) in self.patterns.iter().enumerate() {
            let caps = pattern.captures(&lines[start + offset])?;

            for name in pattern.capture_names().flatten() {
                if let Some(value) = caps.name(name) {
                    if let Err(e) = captured.insert(name, value.as_str()) {
                        return Some(Err(e));
                    }
                }
            }
        }

        Some(Ok(captured))
    }
}

/// Match `step` from `cursor`, never touching lines at or after `end`.
///
/// On success the captures are merged into `context` and the cursor past
/// the consumed lines is returned. On failure neither is modified.
pub fn match_step(
    lines: &[String],
    cursor: usize,
    end: usize,
    step: &Step,
    context: &mut Context,
) -> Result<usize, StepError> {
    let end = end.min(lines.len());
    let count = step.line_count();

    let last_start = if step.adjacent {
        cursor + 1
    } else {
        end.saturating_sub(count) + 1
    };

    let mut start = cursor;
    while start < last_start && start + count <= end {
        if let Some(captured) = step.captures_at(lines, start) {
            let captured = captured?;
            context.merge(&captured)?;
            return Ok(start + count);
        }
        start += 1;
    }

    Err(StepError::NoMatch {
        pattern: step.describe(),
        line: cursor,
    })
}
