pub mod json;
pub mod table;

use granska_core::error::GranskaError;
use granska_core::model::AuditReport;
use std::path::PathBuf;

/// Print the report in `format`, or save it as JSON when `output_file` is set.
pub fn emit(
    report: &AuditReport,
    format: &str,
    output_file: Option<PathBuf>,
) -> Result<(), GranskaError> {
    match output_file {
        Some(path) => {
            // Always write JSON when saving to file
            json::write(report, &path)?;
            eprintln!(
                "Extracted {} non-compliance(s), written to {}",
                report.non_compliances.len(),
                path.display()
            );
        }
        None => match format {
            "json" => json::print(report)?,
            _ => print!("{}", table::format_report(report)),
        },
    }
    Ok(())
}
