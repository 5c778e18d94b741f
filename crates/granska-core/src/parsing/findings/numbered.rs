//! Numbered question templates: `X.Y question text ... Answer obtained/max`.
//!
//! Each question line starts a small state machine that walks forward over
//! the following lines, first to find the score, then to pick up a trailing
//! wrapped line of question text, then to gather the auditor's comments.

use crate::config::EngineConfig;
use crate::extraction::Line;
use crate::model::NonComplianceFinding;
use crate::parsing::normalize::{collapse_whitespace, truncate_with_ellipsis};
use crate::parsing::patterns::{self, question_id, QuestionId};
use crate::parsing::sections::SectionMap;
use crate::parsing::values::{has_score_pair, score_pair};
use regex::Regex;
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::trace;

fn re(pattern: &str) -> Regex {
    Regex::new(pattern).expect("numbered question regex")
}

static RATING_AND_SCORE: LazyLock<Regex> = LazyLock::new(|| {
    re(r"(?i)(?:^|\s+)(?:No|Poor|Average|Good|Excellent)\s+\d+\s*/\s*\d+.*$")
});
static TRAILING_RATING: LazyLock<Regex> =
    LazyLock::new(|| re(r"(?i)(?:^|\s+)(?:No|Poor|Average|Good|Excellent)\s*$"));
static SCORE_TAIL: LazyLock<Regex> = LazyLock::new(|| re(r"(?:^|\s+)\d+\s*/\s*\d+.*$"));
static COMMENTS_PREFIX: LazyLock<Regex> = LazyLock::new(|| re(r"(?i)^Comments:\s*"));
static DASHED_COMMENT: LazyLock<Regex> = LazyLock::new(|| re(r"(?i)Comments:\s*(-.*)$"));
static STARTS_COMMENTS: LazyLock<Regex> = LazyLock::new(|| re(r"(?i)^Comments"));
static STARTS_TOTAL_SCORE: LazyLock<Regex> = LazyLock::new(|| re(r"(?i)^Total\s*Score"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    /// Looking for the `obtained/max` pair, collecting wrapped question text.
    SeekingScore,
    /// Score found; one more short line may still belong to the question.
    CollectingContinuation,
    CollectingComments,
    Done,
}

/// Whether the line that was just looked at has been used up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cursor {
    Advance,
    Stay,
}

/// Everything gathered for one question while its lines are walked.
struct QuestionBlock {
    start: usize,
    parts: Vec<String>,
    /// Set once an intermediate line ends the question text.
    text_closed: bool,
    score: Option<(u32, u32)>,
    comments: Vec<String>,
    /// Index past the last line the comment scan may look at.
    comment_end: Option<usize>,
}

impl QuestionBlock {
    fn new(start: usize, first_text: &str) -> Self {
        let first = strip_answer_and_score(first_text);
        QuestionBlock {
            start,
            parts: if first.is_empty() { vec![] } else { vec![first] },
            text_closed: false,
            score: None,
            comments: Vec::new(),
            comment_end: None,
        }
    }

    fn step(
        &mut self,
        stage: Stage,
        idx: usize,
        text: Option<&str>,
        config: &EngineConfig,
    ) -> (Stage, Cursor) {
        match stage {
            Stage::SeekingScore => self.seek_score(idx, text, config.score_lookahead),
            Stage::CollectingContinuation => self.continuation(text),
            Stage::CollectingComments => self.comment(idx, text, config.comment_max_lines),
            Stage::Done => (Stage::Done, Cursor::Stay),
        }
    }

    fn seek_score(&mut self, idx: usize, text: Option<&str>, lookahead: usize) -> (Stage, Cursor) {
        let Some(text) = text else {
            return (Stage::Done, Cursor::Stay);
        };
        let is_first = idx == self.start;
        let past_lookahead = idx > self.start.saturating_add(lookahead);
        if past_lookahead || (!is_first && patterns::is_question_start(text)) {
            return (Stage::Done, Cursor::Stay);
        }

        if let Some((obtained, max)) = score_pair(text) {
            self.score = Some((obtained, max));
            if !is_first {
                self.push_text(strip_answer_and_score(text));
            }
            let next = if max > 0 && obtained < max {
                Stage::CollectingContinuation
            } else {
                Stage::Done
            };
            return (next, Cursor::Advance);
        }

        if !is_first && !self.text_closed {
            if patterns::ends_question_block(text) || patterns::is_comments_label(text) {
                self.text_closed = true;
            } else if is_intermediate_text(text) {
                self.push_text(text.trim().to_string());
            }
        }
        (Stage::SeekingScore, Cursor::Advance)
    }

    fn continuation(&mut self, text: Option<&str>) -> (Stage, Cursor) {
        match text {
            Some(text) if is_trailing_continuation(text) => {
                self.push_text(text.trim().to_string());
                (Stage::CollectingComments, Cursor::Advance)
            }
            _ => (Stage::CollectingComments, Cursor::Stay),
        }
    }

    fn comment(&mut self, idx: usize, text: Option<&str>, max_lines: usize) -> (Stage, Cursor) {
        let end = *self.comment_end.get_or_insert(idx.saturating_add(max_lines));
        let Some(text) = text else {
            return (Stage::Done, Cursor::Stay);
        };
        if idx >= end || patterns::ends_question_block(text) {
            return (Stage::Done, Cursor::Stay);
        }

        let text = text.trim();
        if patterns::is_bare_score(text) {
            return (Stage::CollectingComments, Cursor::Advance);
        }

        if COMMENTS_PREFIX.is_match(text) {
            let after = COMMENTS_PREFIX.replace(text, "");
            let after = after.trim();
            if after.chars().count() > 2 {
                self.comments.push(after.to_string());
            }
        } else if let Some(caps) = DASHED_COMMENT.captures(text) {
            let after = caps[1].trim();
            if after.chars().count() > 2 {
                self.comments.push(after.to_string());
            }
        } else if text.chars().count() > 3 {
            self.comments.push(text.to_string());
        }
        (Stage::CollectingComments, Cursor::Advance)
    }

    fn push_text(&mut self, text: String) {
        if !text.is_empty() {
            self.parts.push(text);
        }
    }
}

/// Find every numbered question that scored below its maximum.
///
/// Findings come back ordered by `(major, minor)`; when the same id is
/// printed twice only the first occurrence is kept.
pub fn detect_numbered(
    lines: &[Line],
    sections: &SectionMap,
    config: &EngineConfig,
) -> Vec<NonComplianceFinding> {
    let mut seen = HashSet::new();
    let mut found: Vec<(QuestionId, NonComplianceFinding)> = lines
        .iter()
        .enumerate()
        .filter_map(|(idx, line)| {
            let (id, rest) = question_id(&line.text)?;
            scan_question(lines, idx, id, rest, sections, config)
        })
        .filter(|(id, _)| {
            let fresh = seen.insert(id.raw.clone());
            if !fresh {
                trace!(id = %id.raw, "duplicate question id, keeping first");
            }
            fresh
        })
        .collect();

    found.sort_by_key(|(id, _)| id.sort_key());
    found.into_iter().map(|(_, finding)| finding).collect()
}

fn scan_question(
    lines: &[Line],
    start: usize,
    id: QuestionId,
    rest: &str,
    sections: &SectionMap,
    config: &EngineConfig,
) -> Option<(QuestionId, NonComplianceFinding)> {
    let mut block = QuestionBlock::new(start, rest);
    let mut stage = Stage::SeekingScore;
    let mut idx = start;

    while stage != Stage::Done {
        let text = lines.get(idx).map(|l| l.text.as_str());
        let (next, cursor) = block.step(stage, idx, text, config);
        if cursor == Cursor::Advance {
            idx += 1;
        }
        stage = next;
    }

    let (obtained, max) = block.score?;
    if max == 0 || obtained >= max {
        return None;
    }

    let question = collapse_whitespace(&block.parts.join(" "));
    let comments = truncate_with_ellipsis(
        block.comments.join(" ").trim(),
        config.comment_max_chars,
    );
    trace!(id = %id.raw, obtained, max, "numbered non-compliance");

    let line = &lines[start];
    let finding = NonComplianceFinding {
        id: id.raw.clone(),
        section: sections.get(&id.raw).unwrap_or("").to_string(),
        question,
        points_lost: max - obtained,
        max_points: max,
        section_obtained: Decimal::ZERO,
        section_total: Decimal::ZERO,
        section_percentage: Decimal::ZERO,
        auditor_comments: comments,
        page: line.page,
        y_position: line.y,
    };
    Some((id, finding))
}

/// Remove the answer word and `obtained/max` score from a line of question text.
fn strip_answer_and_score(text: &str) -> String {
    let text = RATING_AND_SCORE.replace(text, "");
    let text = TRAILING_RATING.replace(&text, "");
    let text = SCORE_TAIL.replace(&text, "");
    text.trim().to_string()
}

/// A line between the question line and its score line that wraps the question.
fn is_intermediate_text(text: &str) -> bool {
    let len = text.trim().chars().count();
    len > 3 && len < 200 && !patterns::is_bare_score(text.trim())
}

/// A short line right after the score line that finishes the question text.
fn is_trailing_continuation(text: &str) -> bool {
    let text = text.trim();
    let len = text.chars().count();
    len > 3
        && len < 80
        && !patterns::has_numbered_prefix(text)
        && !STARTS_COMMENTS.is_match(text)
        && !STARTS_TOTAL_SCORE.is_match(text)
        && !has_score_pair(text)
        && !patterns::is_bare_percent(text)
        && !text.starts_with('-')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::sections::build_section_map;

    fn lines(texts: &[&str]) -> Vec<Line> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| Line::from_text(*t, 1 + i / 40, (i % 40) as f32 * 10.0))
            .collect()
    }

    fn detect(texts: &[&str]) -> Vec<NonComplianceFinding> {
        detect_with(texts, &EngineConfig::default())
    }

    fn detect_with(texts: &[&str], config: &EngineConfig) -> Vec<NonComplianceFinding> {
        let ls = lines(texts);
        detect_numbered(&ls, &build_section_map(&ls), config)
    }

    #[test]
    fn test_single_line_question_with_comment() {
        let found = detect(&[
            "2. Access Control",
            "Total Score: 20 Obtained: 15",
            "2.1 Door locks checked Poor 1/3",
            "Comments: lock broken",
        ]);
        assert_eq!(found.len(), 1);
        let f = &found[0];
        assert_eq!(f.id, "2.1");
        assert_eq!(f.section, "Access Control");
        assert_eq!(f.question, "Door locks checked");
        assert_eq!(f.points_lost, 2);
        assert_eq!(f.max_points, 3);
        assert_eq!(f.auditor_comments, "lock broken");
        assert_eq!(f.page, 1);
        assert_eq!(f.y_position, 20.0);
    }

    #[test]
    fn test_full_marks_not_reported() {
        assert!(detect(&["1.1 Signage lit Good 5/5"]).is_empty());
    }

    #[test]
    fn test_zero_max_not_reported() {
        assert!(detect(&["1.1 Not applicable 0/0"]).is_empty());
    }

    #[test]
    fn test_score_on_later_line_joins_text_once() {
        let found = detect(&[
            "3. Stock Room",
            "Total Score: 10 Obtained: 7",
            "3.1 Are stock rooms",
            "kept tidy and free of clutter Poor 1/3",
            "at all times",
        ]);
        assert_eq!(found.len(), 1);
        assert_eq!(
            found[0].question,
            "Are stock rooms kept tidy and free of clutter at all times"
        );
        assert_eq!(found[0].points_lost, 2);
    }

    #[test]
    fn test_intermediate_lines_joined() {
        let found = detect(&[
            "4.2 Is the cold chain",
            "log completed for",
            "every delivery",
            "No 0/4",
        ]);
        assert_eq!(found.len(), 1);
        assert_eq!(
            found[0].question,
            "Is the cold chain log completed for every delivery"
        );
        assert_eq!(found[0].points_lost, 4);
    }

    #[test]
    fn test_score_beyond_lookahead_ignored() {
        let found = detect(&[
            "4.2 Is the cold chain",
            "line one",
            "line two",
            "line three",
            "line four",
            "No 0/4",
        ]);
        assert!(found.is_empty());
    }

    #[test]
    fn test_next_question_stops_score_search() {
        let found = detect(&["1.1 Floor clean", "1.2 Lights on Poor 1/2"]);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "1.2");
        assert_eq!(found[0].question, "Lights on");
    }

    #[test]
    fn test_comments_stop_at_next_question_and_skip_scores() {
        let found = detect(&[
            "1.1 Fire exits clear No 0/5",
            "Comments: boxes stacked",
            "5/5",
            "in corridor B",
            "1.2 Extinguisher tagged Yes 2/2",
            "ignored",
        ]);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].auditor_comments, "boxes stacked in corridor B");
    }

    #[test]
    fn test_dashed_inline_comment() {
        let found = detect(&[
            "1.1 Till drawer closed No 0/2",
            "Comments: none",
            "Follow-up Comments: - left open",
        ]);
        assert_eq!(found[0].auditor_comments, "none - left open");
    }

    #[test]
    fn test_short_comment_fragments_dropped() {
        let found = detect(&["1.1 Till drawer closed No 0/2", "Comments: ok", "n/a"]);
        assert_eq!(found[0].auditor_comments, "");
    }

    #[test]
    fn test_comment_truncated() {
        let long = format!("Comments: {}", "word ".repeat(100));
        let found = detect(&["1.1 Backroom tidy Poor 1/5", long.as_str()]);
        let comment = &found[0].auditor_comments;
        assert_eq!(comment.chars().count(), 300);
        assert!(comment.ends_with("..."));
    }

    #[test]
    fn test_comment_line_limit() {
        let config = EngineConfig {
            comment_max_lines: 2,
            ..Default::default()
        };
        let found = detect_with(
            &[
                "1.1 Backroom tidy Poor 1/5",
                "Comments: first remark",
                "second remark",
                "third remark",
            ],
            &config,
        );
        assert_eq!(found[0].auditor_comments, "first remark second remark");
    }

    #[test]
    fn test_sorted_by_numeric_id_and_deduplicated() {
        let found = detect(&[
            "10.1 Later question No 0/1",
            "2.10 Middle question No 0/1",
            "2.9 Early question No 0/1",
            "2.9 Repeated header copy Poor 1/3",
        ]);
        let ids: Vec<&str> = found.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["2.9", "2.10", "10.1"]);
        assert_eq!(found[0].question, "Early question");
        assert_eq!(found[0].max_points, 1);
    }

    #[test]
    fn test_repeated_id_keeps_first_section() {
        let found = detect(&[
            "2. Access Control",
            "Total Score: 20 Obtained: 15",
            "2.1 Door locks checked Poor 1/3",
            "3. Cash Handling",
            "Total Score: 10 Obtained: 10",
            "2.1 Safe closed Average 2/5",
        ]);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].question, "Door locks checked");
        assert_eq!(found[0].section, "Access Control");
    }

    #[test]
    fn test_huge_line_limits_do_not_overflow() {
        let config = EngineConfig {
            comment_max_lines: usize::MAX,
            score_lookahead: usize::MAX,
            ..Default::default()
        };
        let found = detect_with(
            &["1.1 Door locked Poor 1/3", "Comments: broken", "1.2 Alarm set", "No 0/2"],
            &config,
        );
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].auditor_comments, "broken");
        assert_eq!(found[1].question, "Alarm set");
    }

    #[test]
    fn test_yes_is_kept_in_question_text() {
        let found = detect(&["1.1 Receipt offered Yes 1/2"]);
        assert_eq!(found[0].question, "Receipt offered Yes");
    }

    #[test]
    fn test_strip_answer_and_score() {
        assert_eq!(strip_answer_and_score("Door locks checked Poor 1/3"), "Door locks checked");
        assert_eq!(strip_answer_and_score("Are bins emptied No"), "Are bins emptied");
        assert_eq!(strip_answer_and_score("Poor 1/3"), "");
        assert_eq!(strip_answer_and_score("2/3"), "");
        assert_eq!(strip_answer_and_score("Staff greeted customers"), "Staff greeted customers");
    }

    #[test]
    fn test_trailing_continuation_rules() {
        assert!(is_trailing_continuation("at all times"));
        assert!(!is_trailing_continuation("3.2 Next"));
        assert!(!is_trailing_continuation("Comments: x"));
        assert!(!is_trailing_continuation("Total Score: 4"));
        assert!(!is_trailing_continuation("80%"));
        assert!(!is_trailing_continuation("- bullet"));
        assert!(!is_trailing_continuation("abc"));
    }
}
