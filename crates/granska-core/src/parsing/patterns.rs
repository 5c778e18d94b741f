//! Line classifiers shared by the section mapper and the finding detectors.
//!
//! Each predicate answers one question about a single line of text, so the
//! stop conditions of the multi-line stitching stay readable at the call
//! site and can be tested one by one.

use regex::Regex;
use std::sync::LazyLock;

fn re(pattern: &str) -> Regex {
    Regex::new(pattern).expect("line pattern")
}

static QUESTION_ID: LazyLock<Regex> = LazyLock::new(|| re(r"^(\d{1,2})\.(\d{1,2})\s+(.*)$"));
static QUESTION_START: LazyLock<Regex> = LazyLock::new(|| re(r"^\d{1,2}\.\d{1,2}\s"));
static SECTION_HEADING: LazyLock<Regex> = LazyLock::new(|| re(r"^\d{1,2}\.\s+[A-Z]"));
static ANSWER_WITH_SCORE: LazyLock<Regex> = LazyLock::new(|| {
    re(r"\b(Yes|No|Poor|Average|Good|Excellent)\b.*\d+\s*/\s*\d+")
});
static SCORE_LABEL_START: LazyLock<Regex> =
    LazyLock::new(|| re(r"(?i)^(Total\s*Score|%\s*ACH|Obtained)"));
static SECTION_SCORE_LABEL: LazyLock<Regex> =
    LazyLock::new(|| re(r"(?i)Total\s*Score|Obtained|%\s*ACH"));
static COMMENTS_LABEL: LazyLock<Regex> = LazyLock::new(|| re(r"(?i)^Comments:"));
static BARE_SCORE: LazyLock<Regex> = LazyLock::new(|| re(r"^\d+\s*/\s*\d+$"));
static BARE_PERCENT: LazyLock<Regex> = LazyLock::new(|| re(r"^\d+\.?\d*%$"));
static NUMBERED_PREFIX: LazyLock<Regex> = LazyLock::new(|| re(r"^\d{1,2}[.\s]"));
static SCORE_BLOCK_LABEL: LazyLock<Regex> =
    LazyLock::new(|| re(r"(?i)Maximum\s*Score|Total\s*Score|Earned\s*Score|Deducted\s*Score"));

/// A numbered question reference such as `2.3`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionId {
    pub major: u32,
    pub minor: u32,
    /// The id exactly as printed, e.g. `"2.03"`.
    pub raw: String,
}

impl QuestionId {
    pub fn sort_key(&self) -> (u32, u32) {
        (self.major, self.minor)
    }
}

/// Split a `"X.Y rest"` line into its question id and the text after it.
pub fn question_id(text: &str) -> Option<(QuestionId, &str)> {
    let caps = QUESTION_ID.captures(text)?;
    let major = caps[1].parse().ok()?;
    let minor = caps[2].parse().ok()?;
    let raw = format!("{}.{}", &caps[1], &caps[2]);
    let rest = caps.get(3).map(|m| m.as_str()).unwrap_or("");
    Some((QuestionId { major, minor, raw }, rest))
}

/// Line opens a numbered question (`X.Y ` prefix).
pub fn is_question_start(text: &str) -> bool {
    QUESTION_START.is_match(text)
}

/// Line opens a numbered section (`N. Capitalised`).
pub fn is_section_heading(text: &str) -> bool {
    SECTION_HEADING.is_match(text)
}

/// Line carries a rating word followed by a score, i.e. the answer row of
/// another question.
pub fn is_answer_with_score(text: &str) -> bool {
    ANSWER_WITH_SCORE.is_match(text)
}

/// Line starts with a section score label (`Total Score`, `% ACH`, `Obtained`).
pub fn is_score_label(text: &str) -> bool {
    SCORE_LABEL_START.is_match(text)
}

/// Line mentions a section score label anywhere.
pub fn mentions_section_score(text: &str) -> bool {
    SECTION_SCORE_LABEL.is_match(text)
}

/// Line mentions a Maximum/Total/Earned/Deducted score label anywhere.
pub fn mentions_score_block(text: &str) -> bool {
    SCORE_BLOCK_LABEL.is_match(text)
}

pub fn is_comments_label(text: &str) -> bool {
    COMMENTS_LABEL.is_match(text)
}

/// Line holds nothing but a score (`1/3`) or a percentage (`75%`).
pub fn is_bare_score(text: &str) -> bool {
    BARE_SCORE.is_match(text) || BARE_PERCENT.is_match(text)
}

pub fn is_bare_percent(text: &str) -> bool {
    BARE_PERCENT.is_match(text)
}

/// Line starts with a one- or two-digit number followed by a dot or space.
pub fn has_numbered_prefix(text: &str) -> bool {
    NUMBERED_PREFIX.is_match(text)
}

/// Stop condition shared by numbered-question stitching and comment
/// collection: the next question, a new section, another answer row, or a
/// section score label.
pub fn ends_question_block(text: &str) -> bool {
    is_question_start(text)
        || is_section_heading(text)
        || is_answer_with_score(text)
        || is_score_label(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_id() {
        let (id, rest) = question_id("2.1 Door locks checked Poor 1/3").unwrap();
        assert_eq!(id.raw, "2.1");
        assert_eq!(id.sort_key(), (2, 1));
        assert_eq!(rest, "Door locks checked Poor 1/3");
    }

    #[test]
    fn test_question_id_keeps_printed_form() {
        let (id, _) = question_id("10.02 Fire exits clear").unwrap();
        assert_eq!(id.raw, "10.02");
        assert_eq!(id.sort_key(), (10, 2));
    }

    #[test]
    fn test_question_id_rejects_section_and_long_numbers() {
        assert!(question_id("2. Access Control").is_none());
        assert!(question_id("123.4 not a question").is_none());
        assert!(question_id("2.1").is_none());
    }

    #[test]
    fn test_section_heading() {
        assert!(is_section_heading("9. Safety & Security"));
        assert!(!is_section_heading("9. lower case item"));
        assert!(!is_section_heading("9.1 Question"));
    }

    #[test]
    fn test_answer_with_score() {
        assert!(is_answer_with_score("Good 3/5"));
        assert!(is_answer_with_score("Fire drill done No 0/2"));
        assert!(!is_answer_with_score("Nothing 0/2"));
        assert!(!is_answer_with_score("good 3/5"));
    }

    #[test]
    fn test_score_labels() {
        assert!(is_score_label("Total Score: 20 Obtained: 15"));
        assert!(is_score_label("% ACH 75"));
        assert!(is_score_label("obtained 15"));
        assert!(!is_score_label("Section Total Score"));
        assert!(mentions_section_score("Section Total Score"));
    }

    #[test]
    fn test_bare_score() {
        assert!(is_bare_score("1/3"));
        assert!(is_bare_score("1 / 3"));
        assert!(is_bare_score("92.5%"));
        assert!(!is_bare_score("Poor 1/3"));
    }

    #[test]
    fn test_ends_question_block() {
        assert!(ends_question_block("3.4 Next question"));
        assert!(ends_question_block("4. Merchandising"));
        assert!(ends_question_block("Average 2/5"));
        assert!(ends_question_block("Total Score 20"));
        assert!(!ends_question_block("Shelf labels were missing"));
    }
}
