//! Sheet transforms selectable per file.

mod minus;
mod sgr;
mod summary;

pub use minus::NegateValues;
pub use sgr::{SgrLayout, SgrSplit};
pub use summary::VatSummary;

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::extract::SheetExtractor;
use crate::models::config::RecontConfig;
use crate::models::output::OutputSheet;
use crate::models::source::SourceTable;

/// Output of a transform: the sheet plus non-fatal warnings.
#[derive(Debug, Clone, Default)]
pub struct Transformed {
    pub sheet: OutputSheet,
    pub warnings: Vec<String>,
}

impl Transformed {
    pub fn new(sheet: OutputSheet) -> Self {
        Self {
            sheet,
            warnings: Vec::new(),
        }
    }
}

/// Trait for per-file sheet transforms.
pub trait SheetTransform {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Transform a loaded table. `file_name` is the bare name of the source
    /// file; some transforms pick their layout from it.
    fn apply(&self, table: SourceTable, file_name: &str) -> Result<Transformed>;
}

impl SheetTransform for SheetExtractor {
    fn name(&self) -> &'static str {
        "extract"
    }

    fn apply(&self, table: SourceTable, file_name: &str) -> Result<Transformed> {
        let result = self.extract_file(&table, file_name);
        Ok(Transformed {
            sheet: OutputSheet::from(&result.table),
            warnings: result.warnings,
        })
    }
}

/// Which transform to run on a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessKind {
    /// Restructure into the canonical import layout.
    #[default]
    Extract,
    /// Negate values and reformat the collection date.
    Minus,
    /// Add the value without deposit-return charges.
    Sgr,
    /// Markup report with a per-VAT-rate summary.
    Adaos,
}

impl ProcessKind {
    pub const ALL: [ProcessKind; 4] = [Self::Extract, Self::Minus, Self::Sgr, Self::Adaos];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Extract => "extract",
            Self::Minus => "minus",
            Self::Sgr => "sgr",
            Self::Adaos => "adaos",
        }
    }

    /// Output file name for a given input file.
    pub fn output_name(self, input: &Path) -> String {
        let name = input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        match self {
            Self::Extract => {
                let stem = input
                    .file_stem()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                format!("Restructured--{stem}.xlsx")
            }
            Self::Minus => format!("Minus--{name}"),
            Self::Sgr => format!("SGR--{name}"),
            Self::Adaos => format!("Adaos--{name}"),
        }
    }

    /// Build the transform for this kind.
    pub fn transform(self, config: &RecontConfig) -> Box<dyn SheetTransform> {
        match self {
            Self::Extract => Box::new(SheetExtractor::from_config(&config.extraction)),
            Self::Minus => Box::new(NegateValues),
            Self::Sgr => Box::new(SgrSplit::new()),
            Self::Adaos => Box::new(VatSummary),
        }
    }
}

impl fmt::Display for ProcessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
