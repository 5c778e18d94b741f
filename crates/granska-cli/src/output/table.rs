use granska_core::model::{AuditReport, ReportInfo};
use std::fmt::Write;

const LABEL_WIDTH: usize = 16;

/// Plain-text rendering of a report: header, scores, then one row per finding.
pub fn format_report(report: &AuditReport) -> String {
    let mut out = String::new();
    format_header(&mut out, &report.info);
    format_scores(&mut out, &report.info);

    if report.non_compliances.is_empty() {
        out.push_str("No non-compliances found.\n");
        return out;
    }

    let _ = writeln!(out, "Non-compliances ({}):\n", report.non_compliances.len());

    let id_width = report
        .non_compliances
        .iter()
        .map(|nc| nc.id.len())
        .max()
        .unwrap_or(2)
        .max(2);
    let section_width = report
        .non_compliances
        .iter()
        .map(|nc| nc.section.chars().count())
        .max()
        .unwrap_or(7)
        .max(7);

    let _ = writeln!(
        out,
        "  {:<id_width$}  {:<section_width$}  {:<7}  Question",
        "ID", "Section", "Lost"
    );
    let _ = writeln!(out, "  {}", "-".repeat(id_width + section_width + 22));

    for nc in &report.non_compliances {
        let lost = format!("{}/{}", nc.points_lost, nc.max_points);
        let _ = writeln!(
            out,
            "  {:<id_width$}  {:<section_width$}  {:<7}  {}",
            nc.id, nc.section, lost, nc.question
        );
        if !nc.auditor_comments.is_empty() {
            let _ = writeln!(
                out,
                "  {:<id_width$}  {:<section_width$}  {:<7}  comment: {}",
                "", "", "", nc.auditor_comments
            );
        }
    }

    let _ = writeln!(out, "\nTotal points lost: {}", report.total_points_lost());
    out
}

fn format_header(out: &mut String, info: &ReportInfo) {
    let visit = match (info.visit_date.is_empty(), info.last_visit_date.is_empty()) {
        (false, false) => format!("{} (last {})", info.visit_date, info.last_visit_date),
        (true, false) => format!("(last {})", info.last_visit_date),
        _ => info.visit_date.clone(),
    };

    let fields = [
        ("Store", info.store_name.as_str()),
        ("Reference", info.reference_id.as_str()),
        ("Visit date", visit.as_str()),
        ("Store manager", info.store_manager.as_str()),
        ("Area manager", info.area_manager.as_str()),
        ("Submitted by", info.submitted_by.as_str()),
        ("Reviewed by", info.reviewed_by.as_str()),
    ];

    let mut any = false;
    for (label, value) in fields.iter().filter(|(_, v)| !v.is_empty()) {
        let _ = writeln!(out, "{:<w$}{}", format!("{label}:"), value, w = LABEL_WIDTH);
        any = true;
    }
    if any {
        out.push('\n');
    }
}

fn format_scores(out: &mut String, info: &ReportInfo) {
    if info.current_score.is_zero() && info.total_score.is_zero() {
        let _ = writeln!(out, "{:<w$}not found\n", "Score:", w = LABEL_WIDTH);
        return;
    }

    let _ = writeln!(
        out,
        "{:<w$}{} / {} ({}%)",
        "Score:",
        info.current_score,
        info.total_score,
        info.percentage,
        w = LABEL_WIDTH
    );
    if info.has_previous() {
        let _ = writeln!(
            out,
            "{:<w$}{} ({}%)",
            "Previous:",
            info.previous_score,
            info.previous_percentage(),
            w = LABEL_WIDTH
        );
    }
    if !info.difference.is_empty() {
        let _ = writeln!(out, "{:<w$}{}", "Difference:", info.difference, w = LABEL_WIDTH);
    }
    out.push('\n');
}
