use std::path::PathBuf;

use crate::output;

pub fn run(
    fragments_file: PathBuf,
    output_format: &str,
    output_file: Option<PathBuf>,
    config_file: Option<PathBuf>,
) -> Result<(), granska_core::error::GranskaError> {
    let config = super::engine_config(config_file.as_deref())?;
    let pages = super::read_fragments(&fragments_file)?;
    let report = granska_core::extract_report_with(&pages, &config);

    output::emit(&report, output_format, output_file)
}
