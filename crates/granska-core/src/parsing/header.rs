use crate::model::ReportInfo;
use regex::Regex;
use std::sync::LazyLock;

/// Ordered fallbacks for one header field: the first pattern that matches
/// anywhere in the document wins, so structured layouts go first and the
/// generic forms last.
struct FieldPatterns(Vec<Regex>);

impl FieldPatterns {
    fn new(patterns: &[&str]) -> Self {
        FieldPatterns(
            patterns
                .iter()
                .map(|p| Regex::new(p).expect("header field regex"))
                .collect(),
        )
    }

    fn grab(&self, text: &str) -> String {
        self.0
            .iter()
            .find_map(|re| re.captures(text))
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default()
    }
}

static STORE_NAME: LazyLock<FieldPatterns> = LazyLock::new(|| {
    FieldPatterns::new(&[
        r"(?i)Store\s*Name\s+(.+?)(?:\s+Reference|\n)",
        r"(?i)Report\s*On\s+(.+?)(?:\n|$)",
    ])
});
static REFERENCE_ID: LazyLock<FieldPatterns> = LazyLock::new(|| {
    FieldPatterns::new(&[
        r"(?i)Reference\s*ID\s*[:\-]?\s*([A-Z0-9\-]+)",
        r"(?i)Reference\s+([A-Z0-9\-]+)",
    ])
});
static STORE_MANAGER: LazyLock<FieldPatterns> = LazyLock::new(|| {
    FieldPatterns::new(&[r"(?i)Store\s*Manager\s*[:\-]?\s*(.+?)(?:\n|Submitted|Area)"])
});
static SUBMITTED_BY: LazyLock<FieldPatterns> = LazyLock::new(|| {
    FieldPatterns::new(&[
        r"(?i)Submitted\s*By\s*[:\-]?\s*(.+?)(?:\n|Area|Reviewed)",
        r"(?i)Filled\s*By\s+(.+?)(?:\s*\(|\n)",
    ])
});
static AREA_MANAGER: LazyLock<FieldPatterns> = LazyLock::new(|| {
    FieldPatterns::new(&[r"(?i)Area\s*Manager\s*[:\-]?\s*(.+?)(?:\n|Reviewed|Regional)"])
});
static REVIEWED_BY: LazyLock<FieldPatterns> = LazyLock::new(|| {
    FieldPatterns::new(&[
        r"(?i)Reviewed\s*By\s*[:\-]?\s*(.+?)(?:\n|Regional|Current)",
        r"(?i)Report\s*By\s+(.+?)(?:\n|$)",
    ])
});
static VISIT_DATE: LazyLock<FieldPatterns> = LazyLock::new(|| {
    FieldPatterns::new(&[
        r"(?i)Current\s*Visit\s*Date\s*[:\-]?\s*([\d\-/]+)",
        r"(?i)Report\s*Date\s+(\d+\s+\w+\s+\d{4})",
    ])
});
static LAST_VISIT_DATE: LazyLock<FieldPatterns> = LazyLock::new(|| {
    FieldPatterns::new(&[r"(?i)Last\s*Visit\s*Date\s*[:\-]?\s*([\d\-/]+)"])
});

/// Extract the identity fields of a report from its flattened text.
///
/// Score fields are left at zero; see [`crate::parsing::summary`].
pub fn parse_header(text: &str) -> ReportInfo {
    ReportInfo {
        store_name: STORE_NAME.grab(text),
        reference_id: REFERENCE_ID.grab(text),
        visit_date: VISIT_DATE.grab(text),
        last_visit_date: LAST_VISIT_DATE.grab(text),
        store_manager: STORE_MANAGER.grab(text),
        area_manager: AREA_MANAGER.grab(text),
        submitted_by: SUBMITTED_BY.grab(text),
        reviewed_by: REVIEWED_BY.grab(text),
        ..Default::default()
    }
}
