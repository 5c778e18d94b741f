use granska_core::error::GranskaError;
use granska_core::model::AuditReport;
use std::path::Path;

pub fn print(report: &AuditReport) -> Result<(), GranskaError> {
    let json = serde_json::to_string_pretty(report)?;
    println!("{json}");
    Ok(())
}

pub fn write(report: &AuditReport, path: &Path) -> Result<(), GranskaError> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)?;
    Ok(())
}
