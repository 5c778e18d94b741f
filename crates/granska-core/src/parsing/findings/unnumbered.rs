//! Checklist templates without question numbers.
//!
//! Every `0/N` score (N > 0) is a finding worth all N points. The question
//! text is stitched together from the score line and its neighbours, and the
//! section comes from the nearest "Maximum Score" block above it.

use crate::extraction::Line;
use crate::model::NonComplianceFinding;
use crate::parsing::normalize::{collapse_whitespace, dedupe_repeated_words};
use crate::parsing::patterns;
use crate::parsing::sections::{anchored_section_for, anchored_sections};
use regex::Regex;
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::trace;

fn re(pattern: &str) -> Regex {
    Regex::new(pattern).expect("checklist regex")
}

static ZERO_SCORE: LazyLock<Regex> = LazyLock::new(|| re(r"\b0\s*/\s*(\d+)"));
static ZERO_SCORE_TAIL: LazyLock<Regex> = LazyLock::new(|| re(r"\b0\s*/\s*\d+.*$"));
static TRAILING_ANSWER: LazyLock<Regex> = LazyLock::new(|| {
    re(concat!(
        r"(?i)\s+(?:Yes|No|NA|Occasionally|Fully\s+\w+|Most\s+of\s+the\s+Time|Daily|Bi-weekly",
        r"|User-Friendly|Meeting\s+Expectations|Highly\s+Effective|Store\s+\S+(?:\s+\S+)?",
        r"|Fully\s+Aligned)\s*$",
    ))
});
static STAT_LINE: LazyLock<Regex> = LazyLock::new(|| re(r"(?i)^\d+%$|^Non$|^Compliant$|^0%$"));
static BOUNDED_SCORE: LazyLock<Regex> = LazyLock::new(|| re(r"\b\d+\s*/\s*\d+\b"));
static PROMPT_OR_COMMENT: LazyLock<Regex> = LazyLock::new(|| re(r"(?i)^If |Comments:"));
static FORWARD_STOP: LazyLock<Regex> =
    LazyLock::new(|| re(r"(?i)^\d{1,2}\.\d|Maximum\s*Score|Total\s*Score|Earned\s*Score|^Comments:"));
static IF_YES_NO: LazyLock<Regex> = LazyLock::new(|| re(r"(?i)^If\s+(?:no|yes)"));
static STARTS_LOWERCASE: LazyLock<Regex> = LazyLock::new(|| re(r"^[a-z]"));
static SUB_PROMPT: LazyLock<Regex> = LazyLock::new(|| re(r"(?i)\s*If\s+(?:yes|no),?\s+.*"));
static INLINE_ANSWER: LazyLock<Regex> = LazyLock::new(|| re(r"\s*::.*$"));
static LEAKED_COMMENT: LazyLock<Regex> = LazyLock::new(|| re(r"(?i)\s*Comments?:\s*(.+)"));
static INLINE_MARKER: LazyLock<Regex> = LazyLock::new(|| re(r"::\s*(.+)"));
static COMMENT_LABEL: LazyLock<Regex> = LazyLock::new(|| re(r"(?i)^Comments?:\s*(.+)"));
static COMMENT_CONTINUATION_REJECT: LazyLock<Regex> = LazyLock::new(|| {
    re(r"(?i)^\d|Maximum|Total|Earned|^Comments|^Are |^Is |^Do |^How |^Who ")
});
static SCORE_BLOCK_END: LazyLock<Regex> = LazyLock::new(|| re(r"(?i)Maximum\s*Score|Total\s*Score"));

const STITCH_BACK: usize = 5;
const STITCH_FORWARD: usize = 5;
const COMMENT_REACH: usize = 7;

/// Find every `0/N` question in an un-numbered checklist.
///
/// Ids are a running count starting at `"1"`, in document order.
pub fn detect_unnumbered(lines: &[Line]) -> Vec<NonComplianceFinding> {
    let sections = anchored_sections(lines);
    let section_names: HashSet<&str> = sections.iter().map(|s| s.name.as_str()).collect();
    let mut findings = Vec::new();

    for (i, line) in lines.iter().enumerate() {
        let Some(max) = zero_score_max(&line.text) else {
            continue;
        };

        let (question, leaked_comment) = stitch_question(lines, i, &section_names);
        if question.chars().count() < 5 {
            trace!(line = %line.text, "zero score without usable question text");
            continue;
        }

        let auditor_comments = leaked_comment.unwrap_or_else(|| nearby_comment(lines, i));
        let id = (findings.len() + 1).to_string();
        trace!(id = %id, max, "checklist non-compliance");

        findings.push(NonComplianceFinding {
            id,
            section: anchored_section_for(&sections, i).to_string(),
            question,
            points_lost: max,
            max_points: max,
            section_obtained: Decimal::ZERO,
            section_total: Decimal::ZERO,
            section_percentage: Decimal::ZERO,
            auditor_comments,
            page: line.page,
            y_position: line.y,
        });
    }

    findings
}

/// The `N` of a `0/N` score, if the line has one with `N > 0`.
fn zero_score_max(text: &str) -> Option<u32> {
    let caps = ZERO_SCORE.captures(text)?;
    caps[1].parse().ok().filter(|&max| max > 0)
}

/// Rebuild the question text around the score line at `i`.
///
/// Returns the cleaned question and any comment that had been wrapped into
/// the same run of lines.
fn stitch_question(
    lines: &[Line],
    i: usize,
    section_names: &HashSet<&str>,
) -> (String, Option<String>) {
    let before_score = ZERO_SCORE_TAIL.replace(&lines[i].text, "");
    let cleaned = TRAILING_ANSWER.replace(before_score.trim(), "");
    let cleaned = cleaned.trim();
    let cleaned_len = cleaned.chars().count();

    let mut parts: Vec<&str> = Vec::new();
    if cleaned_len > 10 {
        parts.push(cleaned);
    }

    if parts.is_empty() || cleaned_len < 30 {
        for j in (i.saturating_sub(STITCH_BACK)..i).rev() {
            let prev = lines[j].text.trim();
            if stops_backward(prev, j + 1 < i, section_names) {
                break;
            }
            let len = prev.chars().count();
            if !prev.contains("_%") && len > 3 && len < 200 {
                parts.insert(0, prev);
            }
        }
    }

    for next in lines.iter().skip(i + 1).take(STITCH_FORWARD) {
        let next = next.text.trim();
        if FORWARD_STOP.is_match(next) {
            break;
        }
        if IF_YES_NO.is_match(next) || BOUNDED_SCORE.is_match(next) {
            continue;
        }
        if is_question_wrap(next) {
            parts.push(next);
        }
    }

    let question = dedupe_repeated_words(&collapse_whitespace(&parts.join(" ")));
    let question = SUB_PROMPT.replace(&question, "");
    let question = INLINE_ANSWER.replace(question.trim(), "");
    let question = question.trim();

    match LEAKED_COMMENT.captures(question) {
        Some(caps) => {
            let comment = caps[1].trim().to_string();
            let question = LEAKED_COMMENT.replace(question, "").trim().to_string();
            (question, Some(comment))
        }
        None => (question.to_string(), None),
    }
}

/// A line above the score that belongs to a different block.
///
/// `distant` is true for lines more than one above the score line; only
/// those are cut off by a score of their own.
fn stops_backward(prev: &str, distant: bool, section_names: &HashSet<&str>) -> bool {
    patterns::mentions_score_block(prev)
        || STAT_LINE.is_match(prev)
        || (distant && BOUNDED_SCORE.is_match(prev))
        || section_names.contains(prev)
        || PROMPT_OR_COMMENT.is_match(prev)
}

/// A line below the score that wraps the question: ends in `?` or starts lowercase.
fn is_question_wrap(next: &str) -> bool {
    let len = next.chars().count();
    len > 2
        && len < 100
        && !next.contains("_%")
        && (next.ends_with('?') || STARTS_LOWERCASE.is_match(next))
}

/// The first `:: answer` or `Comments:` text within a few lines of the score.
fn nearby_comment(lines: &[Line], i: usize) -> String {
    for (j, line) in lines.iter().enumerate().skip(i + 1).take(COMMENT_REACH) {
        let text = line.text.trim();
        let found = INLINE_MARKER
            .captures(text)
            .or_else(|| COMMENT_LABEL.captures(text))
            .map(|caps| caps[1].trim().to_string());

        if let Some(mut comment) = found {
            if let Some(next) = lines.get(j + 1) {
                if !COMMENT_CONTINUATION_REJECT.is_match(&next.text) {
                    comment.push(' ');
                    comment.push_str(next.text.trim());
                }
            }
            return comment;
        }

        if SCORE_BLOCK_END.is_match(text) {
            break;
        }
    }
    String::new()
}
