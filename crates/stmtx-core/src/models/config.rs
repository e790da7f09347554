//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};

/// Main configuration for stmtx.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StmtxConfig {
    /// Extraction configuration.
    pub extraction: ExtractionConfig,

    /// Output configuration.
    pub output: OutputConfig,
}

/// Extraction engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Issuer labels to enable. Empty enables every bundled issuer.
    pub issuers: Vec<String>,

    /// Default cap on block length in lines, for blocks that set none.
    pub max_block_lines: Option<usize>,

    /// Exit with an error status when any block fails.
    pub fail_on_errors: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            issuers: Vec::new(),
            max_block_lines: None,
            fail_on_errors: false,
        }
    }
}

/// Output format for extracted items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
    Text,
}

/// Output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format.
    pub format: OutputFormat,

    /// Pretty-print JSON.
    pub pretty: bool,

    /// Include block errors in the output document.
    pub include_errors: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Json,
            pretty: true,
            include_errors: true,
        }
    }
}

impl StmtxConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: StmtxConfig =
            serde_json::from_str(r#"{"extraction": {"max_block_lines": 40}}"#).unwrap();

        assert_eq!(config.extraction.max_block_lines, Some(40));
        assert!(config.extraction.issuers.is_empty());
        assert_eq!(config.output.format, OutputFormat::Json);
        assert!(config.output.pretty);
    }

    #[test]
    fn test_output_format_names() {
        let config: OutputConfig = serde_json::from_str(r#"{"format": "csv"}"#).unwrap();
        assert_eq!(config.format, OutputFormat::Csv);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = StmtxConfig::default();
        config.extraction.issuers = vec!["E*TRADE Securities LLC".to_string()];
        config.extraction.fail_on_errors = true;
        config.output.format = OutputFormat::Text;
        config.save(&path).unwrap();

        let loaded = StmtxConfig::from_file(&path).unwrap();
        assert_eq!(loaded.extraction.issuers, config.extraction.issuers);
        assert!(loaded.extraction.fail_on_errors);
        assert_eq!(loaded.output.format, OutputFormat::Text);
    }
}
