pub mod config;
pub mod error;
pub mod extraction;
pub mod model;
pub mod parsing;

use config::EngineConfig;
use error::GranskaError;
use extraction::lines::reconstruct_lines;
use extraction::{Fragment, FragmentSource, Line};
use model::AuditReport;
use tracing::{debug, warn};

/// Extract an audit report from per-page fragments with the default config.
pub fn extract_report(pages: &[Vec<Fragment>]) -> AuditReport {
    extract_report_with(pages, &EngineConfig::default())
}

/// Extract an audit report from per-page fragments.
///
/// Never fails: fields that can't be found stay empty or zero, and a
/// document with no recognizable questions has no findings.
pub fn extract_report_with(pages: &[Vec<Fragment>], config: &EngineConfig) -> AuditReport {
    let lines = reconstruct_lines(pages, config.band_width);
    debug!(pages = pages.len(), lines = lines.len(), "lines reconstructed");
    extract_from_lines(&lines, config)
}

/// Extract an audit report from lines that are already in reading order.
pub fn extract_from_lines(lines: &[Line], config: &EngineConfig) -> AuditReport {
    parsing::parse_lines(lines, config)
}

/// Main API entry point: read a PDF through `source` and extract its report.
pub fn parse_pdf(
    pdf_bytes: &[u8],
    source: &dyn FragmentSource,
    config: &EngineConfig,
) -> Result<AuditReport, GranskaError> {
    let pages = source.extract_pages(pdf_bytes)?;
    if pages.is_empty() {
        warn!(backend = source.backend_name(), "document has no pages");
    }
    Ok(extract_report_with(&pages, config))
}
