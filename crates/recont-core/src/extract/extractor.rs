//! Sheet-level extraction into the canonical layout.

use std::collections::HashMap;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::models::canonical::{CanonicalField, CanonicalRecord, CanonicalTable, TaxOption};
use crate::models::config::ExtractionConfig;
use crate::models::source::{SourceRow, SourceTable};

use super::normalizer::normalize;
use super::rules::document_type::{classify, DocumentType};
use super::rules::tax::TaxDerivation;
use super::styles::{RowContext, RowStyle, StyleChain};

/// Result of extracting one source sheet.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// Canonical rows, one per source row.
    pub table: CanonicalTable,
    /// Document type the rows were labelled with.
    pub document_type: DocumentType,
    /// Number of rows accepted by each style.
    pub style_counts: HashMap<RowStyle, usize>,
    /// 1-based indices of rows that fell back to a default record.
    pub default_rows: Vec<usize>,
    /// Extraction warnings.
    pub warnings: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Per-file state, dropped once the file is done.
struct ExtractionContext<'a> {
    source_file_name: &'a str,
    merchandise_label: &'static str,
    table: CanonicalTable,
    result_warnings: Vec<String>,
    default_rows: Vec<usize>,
    style_counts: HashMap<RowStyle, usize>,
}

/// Drives classification, the style chain and normalization over a sheet.
#[derive(Debug, Clone)]
pub struct SheetExtractor {
    chain: StyleChain,
    currency: String,
}

impl SheetExtractor {
    /// Create an extractor with the default style order.
    pub fn new() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            chain: StyleChain::new(config.style_order.clone()).with_strict(config.strict_styles),
            currency: config.currency.clone(),
        }
    }

    /// Replace the style chain.
    pub fn with_chain(mut self, chain: StyleChain) -> Self {
        self.chain = chain;
        self
    }

    pub fn chain(&self) -> &StyleChain {
        &self.chain
    }

    /// Classify the file name, then extract.
    pub fn extract_file(&self, table: &SourceTable, source_file_name: &str) -> ExtractionResult {
        let document_type = classify(source_file_name);
        self.extract(table, document_type, source_file_name)
    }

    /// Extract every row of `table`.
    ///
    /// Never fails: a row no style can read becomes a default row carrying a
    /// placeholder article, so reviewers can find it downstream.
    pub fn extract(
        &self,
        table: &SourceTable,
        document_type: DocumentType,
        source_file_name: &str,
    ) -> ExtractionResult {
        let start = Instant::now();

        info!(
            "Extracting {} rows from {} as {}",
            table.row_count(),
            source_file_name,
            document_type
        );

        let mut ctx = ExtractionContext {
            source_file_name,
            merchandise_label: document_type.merchandise_label(),
            table: CanonicalTable::new(),
            result_warnings: Vec::new(),
            default_rows: Vec::new(),
            style_counts: HashMap::new(),
        };

        for (i, row) in table.rows.iter().enumerate() {
            self.process_row(&mut ctx, row, i + 1);
        }

        // Default rows and matched rows are written independently; keep the
        // columns in lockstep regardless.
        normalize(&mut ctx.table);

        debug!(
            "Extracted {} rows from {} ({} defaulted)",
            ctx.table.row_count(),
            ctx.source_file_name,
            ctx.default_rows.len()
        );

        ExtractionResult {
            table: ctx.table,
            document_type,
            style_counts: ctx.style_counts,
            default_rows: ctx.default_rows,
            warnings: ctx.result_warnings,
            processing_time_ms: start.elapsed().as_millis() as u64,
        }
    }

    fn process_row(&self, ctx: &mut ExtractionContext<'_>, row: &SourceRow, idx: usize) {
        let row_ctx = RowContext {
            merchandise_label: ctx.merchandise_label,
            source_file_name: ctx.source_file_name,
            currency: &self.currency,
        };

        match self.chain.extract_row(row, &row_ctx, idx) {
            Ok(matched) => {
                let mut record = matched.record;
                record.set(CanonicalField::LineNumber, idx.to_string());
                ctx.table.push_record(&record);
                *ctx.style_counts.entry(matched.style).or_default() += 1;
            }
            Err(errors) => {
                let reasons: Vec<String> = errors
                    .iter()
                    .map(|(style, e)| format!("{}: {}", style, e))
                    .collect();
                let message = format!(
                    "Using default values for row {}. Errors: {}",
                    idx,
                    reasons.join("; ")
                );
                warn!("{}", message);

                ctx.table.push_record(&default_record(ctx.merchandise_label, idx));
                ctx.default_rows.push(idx);
                ctx.result_warnings.push(message);
            }
        }
    }
}

impl Default for SheetExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Placeholder record for a row no style could read.
fn default_record(merchandise_label: &str, idx: usize) -> CanonicalRecord {
    let fallback = TaxDerivation::fallback(merchandise_label);
    let mut record = CanonicalRecord::new();
    record.set(CanonicalField::LineNumber, idx.to_string());
    record.set(CanonicalField::ArticleName, fallback.article);
    record.set(CanonicalField::VatOption, TaxOption::Taxabile.as_str());
    record
}
