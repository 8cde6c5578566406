//! Configuration structures for the reshaping pipeline.

use serde::{Deserialize, Serialize};

use crate::error::RecontError;
use crate::extract::styles::RowStyle;

/// Main configuration for recont.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecontConfig {
    /// Row extraction configuration.
    pub extraction: ExtractionConfig,

    /// Input discovery configuration.
    pub input: InputConfig,

    /// Output sheet configuration.
    pub output: OutputConfig,
}

/// Row extraction configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Styles tried for every row, in priority order.
    pub style_order: Vec<RowStyle>,

    /// Reject a style when neither its document number nor its date field is
    /// present, instead of accepting an all-default row.
    pub strict_styles: bool,

    /// Currency written to every extracted row.
    pub currency: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            style_order: RowStyle::DEFAULT_ORDER.to_vec(),
            strict_styles: false,
            currency: "RON".to_string(),
        }
    }
}

/// Input discovery configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// File extensions picked up by batch runs (lowercase, no dot).
    pub extensions: Vec<String>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["xlsx".to_string(), "xls".to_string()],
        }
    }
}

impl InputConfig {
    /// Whether a path has one of the accepted extensions.
    pub fn accepts(&self, path: &std::path::Path) -> bool {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        self.extensions.iter().any(|e| *e == ext)
    }
}

/// Output sheet configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Worksheet name for written files.
    pub sheet_name: String,

    /// Characters added to the longest value when sizing a column.
    pub column_padding: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            sheet_name: "Sheet1".to_string(),
            column_padding: 2,
        }
    }
}

impl RecontConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Check settings serde cannot: a non-empty, duplicate-free style order
    /// and a currency code.
    pub fn validate(&self) -> crate::error::Result<()> {
        let order = &self.extraction.style_order;
        if order.is_empty() {
            return Err(RecontError::Config("extraction.style_order is empty".into()));
        }
        for (i, style) in order.iter().enumerate() {
            if order[..i].contains(style) {
                return Err(RecontError::Config(format!(
                    "extraction.style_order lists {style} twice"
                )));
            }
        }
        if self.extraction.currency.trim().is_empty() {
            return Err(RecontError::Config("extraction.currency is empty".into()));
        }
        Ok(())
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}
