use crate::extraction::Line;
use crate::parsing::normalize::strip_trailing_conjunction;
use crate::parsing::patterns::{self, question_id};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use tracing::trace;

fn re(pattern: &str) -> Regex {
    Regex::new(pattern).expect("section regex")
}

static SECTION_HEADER: LazyLock<Regex> = LazyLock::new(|| re(r"^(\d{1,2})\.\s+([A-Za-z].+)"));
static SUBSECTION_PREFIX: LazyLock<Regex> = LazyLock::new(|| re(r"^\d+\.\d+\s"));
static TRAILING_SCORE_LABEL: LazyLock<Regex> =
    LazyLock::new(|| re(r"(?i)\s*(Total\s*Score|Obtained|%\s*ACH).*$"));
static CONTINUATION_REJECT: LazyLock<Regex> = LazyLock::new(|| {
    re(r"(?i)Total\s*Score|Obtained|%\s*ACH|^\d+[.\s%]|Maximum|Earned|Deducted")
});
static LEADING_SCORE: LazyLock<Regex> = LazyLock::new(|| re(r"^\d+\s*/\s*\d+"));

static MAXIMUM_SCORE: LazyLock<Regex> = LazyLock::new(|| re(r"(?i)Maximum\s*Score"));
static ANCHOR_STAT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    re(r"(?i)Maximum|Total\s*Score|Earned|Deducted|^\d|^Non$|Compliant|^0%|^\d+%")
});
static ANCHOR_REPORT_FIELD: LazyLock<Regex> =
    LazyLock::new(|| re(r"(?i)Process\s*Name|Overall\s*Report|Reference|Author|Filled|Report"));
static QUESTION_PROMPT: LazyLock<Regex> =
    LazyLock::new(|| re(r"(?i)^(Is |Are |How |Do |Does |Who |Please |If )"));
static ANY_SCORE: LazyLock<Regex> = LazyLock::new(|| re(r"\d+\s*/\s*\d+"));

/// Lines after a candidate heading searched for its score block.
const SCORE_BLOCK_REACH: usize = 3;
/// Lines after a "Maximum Score" label searched for the section name.
const ANCHOR_REACH: usize = 6;

/// Question id (`"2.3"`) to the name of the section it appears under.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionMap(BTreeMap<String, String>);

impl SectionMap {
    pub fn get(&self, question_id: &str) -> Option<&str> {
        self.0.get(question_id).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Map every numbered question to the section heading above it.
///
/// A `"N. Name"` line only counts as a heading when a section score label
/// (`Total Score`, `Obtained`, `% ACH`) appears on it or the two lines after
/// it; numbered narrative bullets have no score block and are skipped.
/// Questions seen before any heading map to an empty name.
pub fn build_section_map(lines: &[Line]) -> SectionMap {
    let (map, _) = lines.iter().enumerate().fold(
        (BTreeMap::new(), String::new()),
        |(mut map, current), (idx, line)| {
            let current = section_heading_at(lines, idx).unwrap_or(current);
            if let Some((id, _)) = question_id(&line.text) {
                map.entry(id.raw).or_insert_with(|| current.clone());
            }
            (map, current)
        },
    );
    SectionMap(map)
}

/// The section name if `lines[idx]` is an accepted section heading.
fn section_heading_at(lines: &[Line], idx: usize) -> Option<String> {
    let text = lines[idx].text.as_str();
    let caps = SECTION_HEADER.captures(text)?;
    if SUBSECTION_PREFIX.is_match(text) {
        return None;
    }

    let has_score_block = lines[idx..]
        .iter()
        .take(SCORE_BLOCK_REACH)
        .any(|l| patterns::mentions_section_score(&l.text));
    if !has_score_block {
        trace!(line = text, "numbered line without score block, not a section");
        return None;
    }

    let mut name = TRAILING_SCORE_LABEL.replace(&caps[2], "").trim().to_string();

    if let Some(next) = lines.get(idx + 1) {
        let next = next.text.trim();
        if is_heading_continuation(next) {
            name.push(' ');
            name.push_str(next);
        }
    }

    let name = strip_trailing_conjunction(&name);
    trace!(section = %name, "section heading");
    Some(name)
}

/// A wrapped heading's second line: short, and not a score, amount or question.
fn is_heading_continuation(text: &str) -> bool {
    let len = text.chars().count();
    len > 2
        && len < 40
        && !CONTINUATION_REJECT.is_match(text)
        && !patterns::is_question_start(text)
        && !LEADING_SCORE.is_match(text)
}

/// A section located by its "Maximum Score" label, for un-numbered checklists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchoredSection {
    pub name: String,
    /// Index of the "Maximum Score" line the name was found after.
    pub line_index: usize,
}

/// Sections of an un-numbered checklist, in document order.
///
/// The name is the first plausible short line within six lines after each
/// "Maximum Score" label, skipping score statistics, report fields and
/// question prompts.
pub fn anchored_sections(lines: &[Line]) -> Vec<AnchoredSection> {
    lines
        .iter()
        .enumerate()
        .filter(|(_, line)| MAXIMUM_SCORE.is_match(&line.text))
        .filter_map(|(i, _)| {
            lines
                .iter()
                .skip(i + 1)
                .take(ANCHOR_REACH)
                .map(|l| l.text.trim())
                .find(|t| is_anchored_section_name(t))
                .map(|name| AnchoredSection {
                    name: name.to_string(),
                    line_index: i,
                })
        })
        .collect()
}

fn is_anchored_section_name(text: &str) -> bool {
    let len = text.chars().count();
    len > 3
        && len < 80
        && !ANCHOR_STAT_LINE.is_match(text)
        && !ANCHOR_REPORT_FIELD.is_match(text)
        && !QUESTION_PROMPT.is_match(text)
        && !ANY_SCORE.is_match(text)
}

/// Name of the last anchored section starting at or before `line_index`.
pub fn anchored_section_for(sections: &[AnchoredSection], line_index: usize) -> &str {
    sections
        .iter()
        .take_while(|s| s.line_index <= line_index)
        .last()
        .map(|s| s.name.as_str())
        .unwrap_or("")
}
