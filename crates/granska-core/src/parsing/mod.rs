pub mod correlate;
pub mod findings;
pub mod header;
pub mod normalize;
pub mod patterns;
pub mod sections;
pub mod summary;
pub mod values;

use crate::config::EngineConfig;
use crate::extraction::lines::full_text;
use crate::extraction::Line;
use crate::model::AuditReport;
use tracing::debug;

/// Turn reconstructed lines into an audit report.
///
/// Header fields and the score summary are read from the flattened text;
/// findings come from the line sequence and get their section scores
/// filled in last.
pub fn parse_lines(lines: &[Line], config: &EngineConfig) -> AuditReport {
    let text = full_text(lines);

    let mut info = header::parse_header(&text);
    summary::resolve_scores(lines, &text, &config.score_strategies).apply_to(&mut info);

    let sections = sections::build_section_map(lines);
    debug!(questions = sections.len(), "section map built");

    let mut non_compliances = findings::detect(lines, &sections, config);
    correlate::correlate_section_scores(lines, &mut non_compliances);

    AuditReport {
        info,
        non_compliances,
    }
}
