pub mod config;
pub mod extract;
pub mod lines;
pub mod parse;

use granska_core::config::{load_config, EngineConfig};
use granska_core::error::GranskaError;
use granska_core::extraction::pdftotext::PdftotextSource;
use granska_core::extraction::{Fragment, FragmentSource};
use std::path::Path;

/// The config from `path`, or the defaults.
pub fn engine_config(path: Option<&Path>) -> Result<EngineConfig, GranskaError> {
    match path {
        Some(path) => load_config(path),
        None => Ok(EngineConfig::default()),
    }
}

pub fn is_json(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

/// Per-page fragments from a fragments JSON file.
pub fn read_fragments(path: &Path) -> Result<Vec<Vec<Fragment>>, GranskaError> {
    let json_bytes = std::fs::read(path)?;
    Ok(serde_json::from_slice(&json_bytes)?)
}

/// Per-page fragments from a PDF (via pdftotext) or a fragments JSON file.
pub fn load_pages(path: &Path) -> Result<Vec<Vec<Fragment>>, GranskaError> {
    if is_json(path) {
        return read_fragments(path);
    }
    let pdf_bytes = std::fs::read(path)?;
    PdftotextSource::new().extract_pages(&pdf_bytes)
}
