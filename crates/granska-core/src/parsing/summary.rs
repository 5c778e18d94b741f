//! Overall score resolution.
//!
//! Audit templates print the score summary in several incompatible layouts.
//! Each layout gets its own strategy; the cascade runs them in the
//! configured order and stops as soon as a current score is known.

use crate::extraction::Line;
use crate::model::ReportInfo;
use crate::parsing::values::{number_or_zero, number_tokens, parse_number, percent, percent_value};
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;
use tracing::debug;

fn re(pattern: &str) -> Regex {
    Regex::new(pattern).expect("summary regex")
}

static NEGATIVE_PERCENT: LazyLock<Regex> = LazyLock::new(|| re(r"(-[\d.]+%)"));
static PERCENT_DOWN: LazyLock<Regex> = LazyLock::new(|| re(r"([\d.]+)%\s*↓"));
static PERCENT_UP: LazyLock<Regex> = LazyLock::new(|| re(r"([\d.]+)%\s*↑"));

static SUMMARY_HEADING: LazyLock<Regex> = LazyLock::new(|| re(r"(?i)^Summary$"));
static SECTION_SUMMARY_HEADING: LazyLock<Regex> =
    LazyLock::new(|| re(r"(?i)^Section\s*Summary$"));

static INLINE_CURRENT: LazyLock<Regex> =
    LazyLock::new(|| re(r"(?i)Current\s+Score\s*[:\-]\s*([\d.]+)"));
static INLINE_TOTAL: LazyLock<Regex> =
    LazyLock::new(|| re(r"(?i)Current\s+Total\s+Score\s*[:\-]\s*([\d.]+)"));
static INLINE_PREVIOUS: LazyLock<Regex> =
    LazyLock::new(|| re(r"(?i)Previous\s+Score\s*[:\-]\s*([\d.]+)"));
static INLINE_PERCENT: LazyLock<Regex> =
    LazyLock::new(|| re(r"(?i)Current\s*%\s*ACH\s*[:\-]\s*([\d.]+)"));
static INLINE_DIFFERENCE: LazyLock<Regex> =
    LazyLock::new(|| re(r"(?i)Difference\s*[:\-]\s*(-?[\d.]+%?)"));

static POINTS_AVAILABLE_LABEL: LazyLock<Regex> = LazyLock::new(|| re(r"(?i)Points\s*available"));
static POINTS_AVAILABLE_VALUE: LazyLock<Regex> =
    LazyLock::new(|| re(r"(?i)Points\s*available\s*([\d.]+)"));
static BARE_NUMBER: LazyLock<Regex> = LazyLock::new(|| re(r"^([\d.]+)$"));
static EARNED_SCORE: LazyLock<Regex> = LazyLock::new(|| re(r"(?i)^Earned\s*Score\s+([\d.]+)$"));
static PERCENTAGE_LABEL: LazyLock<Regex> = LazyLock::new(|| re(r"(?i)Percentage"));
static SPACED_PERCENT: LazyLock<Regex> = LazyLock::new(|| re(r"([\d.]+)\s*%"));

/// The score layouts the resolver knows how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreStrategyKind {
    /// "Previous Total Score ... Current Score" header with a value row below.
    HeaderTable,
    /// "Summary" heading followed by a value row with a percentage.
    SummaryBlock,
    /// Independent `Label: value` pairs anywhere in the text.
    InlineLabels,
    /// "Points available" / "Earned Score" / "Percentage" checklist format.
    PointsAvailable,
}

impl ScoreStrategyKind {
    /// All strategies, most specific first.
    pub const ALL: [ScoreStrategyKind; 4] = [
        ScoreStrategyKind::HeaderTable,
        ScoreStrategyKind::SummaryBlock,
        ScoreStrategyKind::InlineLabels,
        ScoreStrategyKind::PointsAvailable,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ScoreStrategyKind::HeaderTable => "header_table",
            ScoreStrategyKind::SummaryBlock => "summary_block",
            ScoreStrategyKind::InlineLabels => "inline_labels",
            ScoreStrategyKind::PointsAvailable => "points_available",
        }
    }

    fn strategy(self) -> ScoreStrategy {
        match self {
            ScoreStrategyKind::HeaderTable => header_table,
            ScoreStrategyKind::SummaryBlock => summary_block,
            ScoreStrategyKind::InlineLabels => inline_labels,
            ScoreStrategyKind::PointsAvailable => points_available,
        }
    }

    /// Run this strategy alone.
    pub fn run(self, lines: &[Line], text: &str) -> Option<PartialScores> {
        (self.strategy())(lines, text)
    }
}

impl fmt::Display for ScoreStrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Shared signature of every cascade strategy.
pub type ScoreStrategy = fn(&[Line], &str) -> Option<PartialScores>;

/// What one strategy found. `None` leaves the field as it was.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialScores {
    pub current_score: Option<Decimal>,
    pub total_score: Option<Decimal>,
    pub previous_score: Option<Decimal>,
    pub percentage: Option<Decimal>,
    pub difference: Option<String>,
}

impl PartialScores {
    fn is_empty(&self) -> bool {
        *self == PartialScores::default()
    }
}

/// The resolved overall scores.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreSummary {
    pub current_score: Decimal,
    pub total_score: Decimal,
    pub previous_score: Decimal,
    pub percentage: Decimal,
    pub difference: String,
}

impl ScoreSummary {
    fn merge(&mut self, partial: PartialScores) {
        if let Some(v) = partial.current_score {
            self.current_score = v;
        }
        if let Some(v) = partial.total_score {
            self.total_score = v;
        }
        if let Some(v) = partial.previous_score {
            self.previous_score = v;
        }
        if let Some(v) = partial.percentage {
            self.percentage = v;
        }
        if let Some(v) = partial.difference {
            self.difference = v;
        }
    }

    pub fn apply_to(self, info: &mut ReportInfo) {
        info.current_score = self.current_score;
        info.total_score = self.total_score;
        info.previous_score = self.previous_score;
        info.percentage = self.percentage;
        info.difference = self.difference;
    }
}

/// Run `strategies` in order until one yields a non-zero current score.
///
/// Fields set by a strategy that did not resolve the current score stay in
/// place for later strategies to overwrite. A missing percentage is derived
/// from current and total at the end.
pub fn resolve_scores(lines: &[Line], text: &str, strategies: &[ScoreStrategyKind]) -> ScoreSummary {
    let mut summary = ScoreSummary::default();

    for &kind in strategies {
        if let Some(partial) = kind.run(lines, text) {
            summary.merge(partial);
        }
        if !summary.current_score.is_zero() {
            debug!(strategy = %kind, current = %summary.current_score, "score summary resolved");
            break;
        }
    }

    if summary.current_score.is_zero() {
        debug!("no strategy produced a current score");
    }

    if summary.percentage.is_zero()
        && summary.current_score > Decimal::ZERO
        && summary.total_score > Decimal::ZERO
    {
        summary.percentage = percent(summary.current_score, summary.total_score);
    }

    summary
}

/// Sign the difference from an explicit minus or a trend arrow.
///
/// `exclude` skips an arrowed value equal to the overall percentage, which
/// some layouts print next to the same arrow.
fn signed_difference(line: &str, exclude: Option<Decimal>) -> Option<String> {
    if let Some(caps) = NEGATIVE_PERCENT.captures(line) {
        return Some(caps[1].to_string());
    }
    arrowed_difference(line, &PERCENT_DOWN, '-', exclude)
        .or_else(|| arrowed_difference(line, &PERCENT_UP, '+', exclude))
}

fn arrowed_difference(
    line: &str,
    pattern: &Regex,
    sign: char,
    exclude: Option<Decimal>,
) -> Option<String> {
    let caps = pattern.captures(line)?;
    if exclude.is_some() && parse_number(&caps[1]) == exclude {
        return None;
    }
    Some(format!("{}{}%", sign, &caps[1]))
}

/// Strategy 1: `Previous Total Score | Previous Score | Current Total Score | Current Score`
/// header, values on the next line in that column order.
fn header_table(lines: &[Line], _text: &str) -> Option<PartialScores> {
    let idx = lines
        .iter()
        .position(|l| l.text.contains("Previous Total Score") && l.text.contains("Current Score"))?;
    let value_line = &lines.get(idx + 1)?.text;

    let nums = number_tokens(value_line);
    if nums.len() < 4 {
        return None;
    }

    let current_total = number_or_zero(nums[2]);
    let total = if current_total.is_zero() {
        number_or_zero(nums[0])
    } else {
        current_total
    };

    Some(PartialScores {
        current_score: Some(number_or_zero(nums[3])),
        total_score: Some(total),
        previous_score: Some(number_or_zero(nums[1])),
        percentage: percent_value(value_line),
        difference: signed_difference(value_line, None),
    })
}

/// Strategy 2: a `Summary` heading, bounded by `Section Summary` or 15 lines.
fn summary_block(lines: &[Line], _text: &str) -> Option<PartialScores> {
    let mut summary_idx = None;
    let mut section_summary_idx = None;
    for (i, line) in lines.iter().enumerate() {
        let text = line.text.trim();
        if summary_idx.is_none() && SUMMARY_HEADING.is_match(text) {
            summary_idx = Some(i);
        }
        if SECTION_SUMMARY_HEADING.is_match(text) {
            section_summary_idx = Some(i);
            break;
        }
    }

    let start = summary_idx?;
    let end = match section_summary_idx {
        Some(s) if s > start => s,
        _ => (start + 15).min(lines.len()),
    };
    let window = start + 1..end;

    let (value_idx, value_line, pct) = window.clone().find_map(|i| {
        let text = lines[i].text.as_str();
        let pct = percent_value(text)?;
        (number_tokens(text).len() >= 2).then_some((i, text, pct))
    })?;
    let nums = number_tokens(value_line);

    let total_score = window
        .filter(|&j| j != value_idx)
        .map(|j| lines[j].text.as_str())
        .find(|t| !t.contains('%') && number_tokens(t).len() >= 2)
        .map(|t| {
            let tokens = number_tokens(t);
            let second = number_or_zero(tokens[1]);
            if second.is_zero() {
                number_or_zero(tokens[0])
            } else {
                second
            }
        });

    Some(PartialScores {
        current_score: Some(number_or_zero(nums[1])),
        total_score,
        previous_score: Some(number_or_zero(nums[0])),
        percentage: Some(pct),
        difference: signed_difference(value_line, Some(pct)),
    })
}

/// Strategy 3: labelled values anywhere in the text.
fn inline_labels(_lines: &[Line], text: &str) -> Option<PartialScores> {
    let number_after = |pattern: &Regex| pattern.captures(text).map(|caps| number_or_zero(&caps[1]));

    let partial = PartialScores {
        current_score: number_after(&*INLINE_CURRENT),
        total_score: number_after(&*INLINE_TOTAL),
        previous_score: number_after(&*INLINE_PREVIOUS),
        percentage: number_after(&*INLINE_PERCENT),
        difference: INLINE_DIFFERENCE
            .captures(text)
            .map(|caps| caps[1].to_string()),
    };
    (!partial.is_empty()).then_some(partial)
}

/// Strategy 4: checklist format with the value on the label line or the one
/// after it. Later matches overwrite earlier ones.
fn points_available(lines: &[Line], _text: &str) -> Option<PartialScores> {
    let mut partial = PartialScores::default();

    for (i, line) in lines.iter().enumerate() {
        let text = line.text.as_str();
        let next = lines.get(i + 1).map(|l| l.text.as_str());

        if POINTS_AVAILABLE_LABEL.is_match(text) {
            let value = POINTS_AVAILABLE_VALUE
                .captures(text)
                .map(|caps| number_or_zero(&caps[1]))
                .or_else(|| {
                    next.and_then(|n| BARE_NUMBER.captures(n))
                        .map(|caps| number_or_zero(&caps[1]))
                });
            if value.is_some() {
                partial.total_score = value;
            }
        }

        if let Some(caps) = EARNED_SCORE.captures(text) {
            partial.current_score = Some(number_or_zero(&caps[1]));
        }

        if PERCENTAGE_LABEL.is_match(text) {
            let value = SPACED_PERCENT
                .captures(text)
                .or_else(|| next.and_then(|n| SPACED_PERCENT.captures(n)))
                .map(|caps| number_or_zero(&caps[1]));
            if value.is_some() {
                partial.percentage = value;
            }
        }
    }

    (!partial.is_empty()).then_some(partial)
}
