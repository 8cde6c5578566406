//! Subcommands.

pub mod batch;
pub mod config;
pub mod process;

use std::path::{Path, PathBuf};

use recont_core::models::config::RecontConfig;
use recont_core::ProcessKind;

/// Transform selected on the command line.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum KindArg {
    /// Canonical 43-column import layout
    #[default]
    Extract,
    /// Negate values, compact the collection date
    Minus,
    /// Insert the value without SGR charges
    Sgr,
    /// Markup report with per-VAT-rate totals
    Adaos,
}

impl From<KindArg> for ProcessKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Extract => ProcessKind::Extract,
            KindArg::Minus => ProcessKind::Minus,
            KindArg::Sgr => ProcessKind::Sgr,
            KindArg::Adaos => ProcessKind::Adaos,
        }
    }
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("recont")
        .join("config.json")
}

/// Load the config given on the command line, else the user config file if
/// one exists, else defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<RecontConfig> {
    let default_path = default_config_path();
    let config = match config_path {
        Some(path) => RecontConfig::from_file(Path::new(path))?,
        None if default_path.exists() => RecontConfig::from_file(&default_path)?,
        None => RecontConfig::default(),
    };

    config.validate()?;
    Ok(config)
}
