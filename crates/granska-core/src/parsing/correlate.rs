use crate::extraction::Line;
use crate::model::NonComplianceFinding;
use crate::parsing::values::{number_or_zero, parse_number, percent};
use regex::Regex;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::trace;

static TOTAL_OBTAINED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Total\s*Score\s*:\s*([\d.]+)\s*Obtained\s*:\s*([\d.]+)")
        .expect("section score regex")
});
static NUMBER_TRIPLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([\d.]+)\s+([\d.]+)\s+([\d.]+)").expect("score triple regex")
});

/// Lines before and after the section name searched for its scores.
const LOOK_BEHIND: usize = 3;
const LOOK_AHEAD: usize = 5;
/// Upper bound on a section total read from a bare number triple.
const TRIPLE_TOTAL_LIMIT: u32 = 200;

#[derive(Debug, Clone, Copy, PartialEq)]
struct SectionScore {
    total: Decimal,
    obtained: Decimal,
}

/// Fill in `section_total`, `section_obtained` and `section_percentage` of
/// each finding from the score block printed near its section's name.
///
/// Only the first line mentioning the section is looked at. Findings whose
/// section name is three characters or shorter, or whose block can't be
/// found, keep zeros.
pub fn correlate_section_scores(lines: &[Line], findings: &mut [NonComplianceFinding]) {
    let mut memo: HashMap<String, Option<SectionScore>> = HashMap::new();

    for finding in findings.iter_mut() {
        if finding.section.chars().count() <= 3 {
            continue;
        }
        let score = *memo
            .entry(finding.section.clone())
            .or_insert_with(|| find_section_score(lines, &finding.section));

        if let Some(score) = score {
            finding.section_total = score.total;
            finding.section_obtained = score.obtained;
            finding.section_percentage = percent(score.obtained, score.total);
        }
    }
}

fn find_section_score(lines: &[Line], section: &str) -> Option<SectionScore> {
    let i = lines.iter().position(|l| l.text.contains(section))?;
    let window = i.saturating_sub(LOOK_BEHIND)..lines.len().min(i + LOOK_AHEAD);

    let score = lines[window.clone()]
        .iter()
        .zip(window)
        .find_map(|(line, j)| labelled_score(&line.text).or_else(|| {
            (j != i).then(|| triple_score(&line.text)).flatten()
        }));

    match score {
        Some(s) => trace!(section, total = %s.total, obtained = %s.obtained, "section score"),
        None => trace!(section, "no section score near heading"),
    }
    score
}

/// `Total Score: T Obtained: O`.
fn labelled_score(text: &str) -> Option<SectionScore> {
    let caps = TOTAL_OBTAINED.captures(text)?;
    Some(SectionScore {
        total: number_or_zero(&caps[1]),
        obtained: number_or_zero(&caps[2]),
    })
}

/// Summary-table row `total obtained percent`, e.g. `14.0 11.0 78.57`.
fn triple_score(text: &str) -> Option<SectionScore> {
    let caps = NUMBER_TRIPLE.captures(text)?;
    let total = parse_number(&caps[1])?;
    let obtained = parse_number(&caps[2])?;
    parse_number(&caps[3])?;
    (total >= obtained && total < Decimal::from(TRIPLE_TOTAL_LIMIT))
        .then_some(SectionScore { total, obtained })
}
