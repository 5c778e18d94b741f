//! Non-compliance detection.
//!
//! Numbered templates (`X.Y question ... obtained/max`) are read first. Only
//! when that finds nothing does the un-numbered checklist scan run, which
//! treats every `0/N` score as a finding.

pub mod numbered;
pub mod unnumbered;

use crate::config::EngineConfig;
use crate::extraction::Line;
use crate::model::NonComplianceFinding;
use crate::parsing::sections::SectionMap;
use tracing::debug;

/// Run the numbered pass and, if it comes back empty, the un-numbered pass.
pub fn detect(
    lines: &[Line],
    sections: &SectionMap,
    config: &EngineConfig,
) -> Vec<NonComplianceFinding> {
    let numbered = numbered::detect_numbered(lines, sections, config);
    if !numbered.is_empty() {
        debug!(count = numbered.len(), "numbered non-compliances found");
        return numbered;
    }

    if !config.unnumbered_fallback {
        debug!("no numbered non-compliances, un-numbered fallback disabled");
        return numbered;
    }

    let unnumbered = unnumbered::detect_unnumbered(lines);
    debug!(
        count = unnumbered.len(),
        "no numbered non-compliances, used un-numbered checklist scan"
    );
    unnumbered
}
