use granska_core::extraction::pdftotext::PdftotextSource;
use std::path::PathBuf;

use crate::output;

pub fn run(
    pdf_file: PathBuf,
    output_format: &str,
    output_file: Option<PathBuf>,
    config_file: Option<PathBuf>,
) -> Result<(), granska_core::error::GranskaError> {
    let config = super::engine_config(config_file.as_deref())?;
    let pdf_bytes = std::fs::read(&pdf_file)?;
    let source = PdftotextSource::new();
    let report = granska_core::parse_pdf(&pdf_bytes, &source, &config)?;

    output::emit(&report, output_format, output_file)
}
