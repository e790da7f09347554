//! Plain-text statement documents.

use std::path::Path;

/// A statement converted to text: a source identifier plus its lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    source: String,
    lines: Vec<String>,
}

impl Document {
    /// Split `text` into lines. Trailing whitespace of each line is dropped.
    pub fn new(source: impl Into<String>, text: &str) -> Self {
        Self {
            source: source.into(),
            lines: text.lines().map(|l| l.trim_end().to_string()).collect(),
        }
    }

    /// Take pre-split lines, dropping trailing whitespace as [`Document::new`] does.
    pub fn from_lines<I, S>(source: impl Into<String>, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            source: source.into(),
            lines: lines
                .into_iter()
                .map(|l| {
                    let mut line: String = l.into();
                    line.truncate(line.trim_end().len());
                    line
                })
                .collect(),
        }
    }

    /// Read a text file; the file name becomes the source identifier.
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let source = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();
        Ok(Self::new(source, &text))
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// The whole text, lines joined by `\n`.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_are_trimmed_at_end() {
        let doc = Document::new("a.txt", "first  \r\n  second\nthird\t");
        assert_eq!(doc.lines(), &["first", "  second", "third"]);
        assert_eq!(doc.source(), "a.txt");
        assert_eq!(doc.text(), "first\n  second\nthird");
    }

    #[test]
    fn test_from_lines_matches_new() {
        let split = Document::from_lines("a.txt", ["BUY  ", "Total Price\t", "x"]);
        assert_eq!(split, Document::new("a.txt", "BUY  \nTotal Price\t\nx"));
        assert_eq!(split.lines()[0], "BUY");
    }

    #[test]
    fn test_empty() {
        assert!(Document::new("empty.txt", "").is_empty());
    }
}
