//! Error types for the recont-core library.

use thiserror::Error;

/// Main error type for the recont library.
#[derive(Error, Debug)]
pub enum RecontError {
    /// The source spreadsheet could not be acquired.
    #[error("load error: {0}")]
    Load(#[from] LoadError),

    /// A sheet transform could not be applied.
    #[error("transform error: {0}")]
    Transform(#[from] TransformError),

    /// The output spreadsheet could not be written.
    #[error("write error: {0}")]
    Write(#[from] WriteError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised while reading a source spreadsheet.
#[derive(Error, Debug)]
pub enum LoadError {
    /// Failed to open or parse the workbook.
    #[error("failed to open workbook: {0}")]
    Open(String),

    /// The workbook contains no worksheet.
    #[error("workbook has no worksheets")]
    NoSheets,

    /// The first worksheet has no header row.
    #[error("worksheet has no header row")]
    MissingHeader,

    /// The file extension is not a spreadsheet format.
    #[error("unsupported file format: {0}")]
    Unsupported(String),
}

/// Errors raised by the column transforms.
#[derive(Error, Debug)]
pub enum TransformError {
    /// A column the transform depends on is absent.
    #[error("column not found: {0}")]
    MissingColumn(String),

    /// The transform produced no rows.
    #[error("no data rows left after {0}")]
    NoData(&'static str),
}

/// Errors raised while writing an output spreadsheet.
#[derive(Error, Debug)]
pub enum WriteError {
    /// The spreadsheet writer rejected the workbook.
    #[error("xlsx writer: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// The sheet is larger than a worksheet can hold.
    #[error("sheet too large: {0}")]
    Overflow(String),
}

/// Errors raised by a single row style while reading one source row.
///
/// These never leave the extraction orchestrator: the next style is tried and,
/// when all of them fail, the row falls back to a default record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StyleError {
    /// A field holds a spreadsheet error value such as `#VALUE!`.
    #[error("{field} holds error value {value}")]
    ErrorCell { field: String, value: String },

    /// Strict mode: none of the style's identifying fields are present.
    #[error("none of {0} are present")]
    NoFields(String),
}

/// Result type for the recont library.
pub type Result<T> = std::result::Result<T, RecontError>;
