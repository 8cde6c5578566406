//! Per-file driver: load, transform, write.

use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::Serialize;
use tracing::{info, warn};

use crate::error::{LoadError, Result};
use crate::io::{SheetReader, SheetWriter, XlsxReader, XlsxWriter};
use crate::models::config::RecontConfig;
use crate::transforms::ProcessKind;

/// Outcome of processing one file.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub kind: ProcessKind,
    /// Rows written, excluding the header row.
    pub rows: usize,
    pub warnings: Vec<String>,
    pub processing_time_ms: u64,
}

/// Runs one [`ProcessKind`] over spreadsheet files.
///
/// Every call starts from a fresh source table and transform, so nothing
/// carries over between files.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: RecontConfig,
    reader: XlsxReader,
    writer: XlsxWriter,
}

impl Pipeline {
    pub fn new(config: RecontConfig) -> Self {
        let writer = XlsxWriter::from_config(&config.output);
        Self {
            config,
            reader: XlsxReader::new(),
            writer,
        }
    }

    pub fn config(&self) -> &RecontConfig {
        &self.config
    }

    /// Process `input` into `output_dir`, naming the result after `kind`.
    pub fn process_into(
        &self,
        input: &Path,
        kind: ProcessKind,
        output_dir: &Path,
    ) -> Result<ProcessReport> {
        let output = output_dir.join(kind.output_name(input));
        self.process(input, kind, &output)
    }

    /// Process `input` and write the result to `output`.
    pub fn process(&self, input: &Path, kind: ProcessKind, output: &Path) -> Result<ProcessReport> {
        let start = Instant::now();

        if !self.config.input.accepts(input) {
            return Err(LoadError::Unsupported(input.display().to_string()).into());
        }

        let file_name = input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        info!("Processing {} ({})", input.display(), kind);

        let table = self.reader.read(input)?;
        let transform = kind.transform(&self.config);
        let transformed = transform.apply(table, &file_name)?;

        for warning in &transformed.warnings {
            warn!("{}: {}", file_name, warning);
        }

        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        self.writer.write(&transformed.sheet, output)?;

        info!(
            "{} wrote {} rows to {}",
            transform.name(),
            transformed.sheet.row_count(),
            output.display()
        );

        Ok(ProcessReport {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            kind,
            rows: transformed.sheet.row_count(),
            warnings: transformed.warnings,
            processing_time_ms: start.elapsed().as_millis() as u64,
        })
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(RecontConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RecontError;
    use crate::models::canonical::CanonicalField;
    use crate::models::output::OutputSheet;
    use crate::models::source::CellValue;

    fn write_input(dir: &Path, name: &str) -> PathBuf {
        let sheet = OutputSheet {
            headers: vec![
                "Numar Factura".into(),
                "Data Document".into(),
                "Nume".into(),
                "CUI/CNP".into(),
                "TVA Achizitie".into(),
            ],
            rows: vec![vec![
                "F100".into(),
                "2024-03-01 00:00:00".into(),
                "Alfa SRL".into(),
                "RO123".into(),
                CellValue::Int(9),
            ]],
        };
        let path = dir.join(name);
        XlsxWriter::new().write(&sheet, &path).unwrap();
        path
    }

    #[test]
    fn test_extract_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(dir.path(), "Intrari_M4.xlsx");
        let out_dir = dir.path().join("out");

        let report = Pipeline::default()
            .process_into(&input, ProcessKind::Extract, &out_dir)
            .unwrap();

        assert_eq!(report.output, out_dir.join("Restructured--Intrari_M4.xlsx"));
        assert_eq!(report.rows, 1);

        let written = XlsxReader::new().read(&report.output).unwrap();
        assert_eq!(written.headers, CanonicalField::headers());
        let row = &written.rows[0];
        assert_eq!(row.text("Numar document"), Some("F100".to_string()));
        assert_eq!(row.text("Data"), Some("20240301".to_string()));
        assert_eq!(row.text("Cod fiscal"), Some("123".to_string()));
        assert_eq!(row.text("Denumire articol"), Some("Materie prima M4 9%".to_string()));
    }

    #[test]
    fn test_unsupported_extension() {
        let err = Pipeline::default()
            .process(Path::new("notes.txt"), ProcessKind::Extract, Path::new("out.xlsx"))
            .unwrap_err();

        assert!(matches!(err, RecontError::Load(LoadError::Unsupported(_))));
    }

    #[test]
    fn test_transform_error_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(dir.path(), "minus.xlsx");

        let err = Pipeline::default()
            .process_into(&input, ProcessKind::Minus, dir.path())
            .unwrap_err();

        assert!(matches!(err, RecontError::Transform(_)));
    }
}
