//! Integration tests for the parse_pdf() / extract_report() pipeline.
//!
//! Uses a MockSource that returns pre-built positioned fragments without
//! invoking pdftotext, so these tests run without poppler-utils.

use granska_core::config::{parse_config_str, EngineConfig};
use granska_core::error::GranskaError;
use granska_core::extraction::{Fragment, FragmentSource, Line};
use granska_core::{extract_from_lines, extract_report, parse_pdf};
use proptest::prelude::*;
use rust_decimal_macros::dec;

struct MockSource {
    pages: Vec<Vec<Fragment>>,
}

impl FragmentSource for MockSource {
    fn extract_pages(&self, _pdf_bytes: &[u8]) -> Result<Vec<Vec<Fragment>>, GranskaError> {
        Ok(self.pages.clone())
    }

    fn backend_name(&self) -> &str {
        "mock"
    }
}

struct FailingSource;

impl FragmentSource for FailingSource {
    fn extract_pages(&self, _pdf_bytes: &[u8]) -> Result<Vec<Vec<Fragment>>, GranskaError> {
        Err(GranskaError::PdftotextNotFound)
    }

    fn backend_name(&self) -> &str {
        "failing"
    }
}

/// One page of fragments, one text row per entry, 15 units apart.
///
/// Each row is split into words with a little baseline jitter and handed
/// over right-to-left, the way a content stream may emit them.
fn page(rows: &[&str]) -> Vec<Fragment> {
    let mut fragments = Vec::new();
    for (r, row) in rows.iter().enumerate() {
        let base = 100.0 + r as f32 * 15.0;
        for (w, word) in row.split_whitespace().collect::<Vec<_>>().into_iter().enumerate().rev() {
            let jitter = if w % 2 == 0 { 0.8 } else { -0.9 };
            fragments.push(Fragment::new(word, 40.0 + w as f32 * 30.0, base + jitter));
        }
    }
    fragments
}

fn extract(pages: Vec<Vec<Fragment>>) -> granska_core::model::AuditReport {
    let source = MockSource { pages };
    parse_pdf(&[], &source, &EngineConfig::default()).unwrap()
}

// ---------------------------------------------------------------------------
// Scenario A: numbered question below max, with a comment
// ---------------------------------------------------------------------------
#[test]
fn numbered_question_with_comment() {
    let report = extract(vec![page(&[
        "2. Access Control",
        "Total Score: 20 Obtained: 15",
        "2.1 Door locks checked Poor 1/3",
        "Comments: lock broken",
    ])]);

    assert_eq!(report.non_compliances.len(), 1);
    let f = &report.non_compliances[0];
    assert_eq!(f.id, "2.1");
    assert_eq!(f.section, "Access Control");
    assert_eq!(f.question, "Door locks checked");
    assert_eq!(f.points_lost, 2);
    assert_eq!(f.max_points, 3);
    assert_eq!(f.auditor_comments, "lock broken");
    assert_eq!(f.section_total, dec!(20));
    assert_eq!(f.section_obtained, dec!(15));
    assert_eq!(f.section_percentage, dec!(75));
    assert_eq!(f.page, 1);
}

// ---------------------------------------------------------------------------
// Scenario B: header-table score summary
// ---------------------------------------------------------------------------
#[test]
fn header_table_score_summary() {
    let report = extract(vec![page(&[
        "Previous Total Score Current Score",
        "14.0 178.0 16.0 192.0 92%",
    ])]);

    let info = &report.info;
    assert_eq!(info.total_score, dec!(16));
    assert_eq!(info.current_score, dec!(192));
    assert_eq!(info.previous_score, dec!(178));
    assert_eq!(info.percentage, dec!(92));
}

// ---------------------------------------------------------------------------
// Scenario C: nothing below max, header and summary still read
// ---------------------------------------------------------------------------
#[test]
fn full_marks_report_has_info_but_no_findings() {
    let report = extract(vec![page(&[
        "Store Name Harbour Point Reference ID: HP-0042",
        "Store Manager: Ana Silva",
        "Current Visit Date: 02/04/2024",
        "Current Score: 48 Current Total Score: 50",
        "1. Store Front",
        "Total Score: 10 Obtained: 10",
        "1.1 Signage lit Good 5/5",
        "1.2 Windows clean Excellent 5/5",
    ])]);

    assert!(report.non_compliances.is_empty());
    assert_eq!(report.info.store_name, "Harbour Point");
    assert_eq!(report.info.reference_id, "HP-0042");
    assert_eq!(report.info.store_manager, "Ana Silva");
    assert_eq!(report.info.visit_date, "02/04/2024");
    assert_eq!(report.info.current_score, dec!(48));
    assert_eq!(report.info.total_score, dec!(50));
    assert_eq!(report.info.percentage, dec!(96));
}

// ---------------------------------------------------------------------------
// Scenario D: question wrapped over three lines, score on the middle one
// ---------------------------------------------------------------------------
#[test]
fn wrapped_question_joined_in_order() {
    let report = extract(vec![page(&[
        "3. Stock Room",
        "Total Score: 10 Obtained: 7",
        "3.1 Are stock rooms",
        "kept tidy and free of clutter Poor 1/3",
        "at all times",
    ])]);

    assert_eq!(report.non_compliances.len(), 1);
    let f = &report.non_compliances[0];
    assert_eq!(
        f.question,
        "Are stock rooms kept tidy and free of clutter at all times"
    );
    assert_eq!(f.section, "Stock Room");
    assert_eq!(f.points_lost, 2);
}

// ---------------------------------------------------------------------------
// Findings across pages keep their page and numeric order
// ---------------------------------------------------------------------------
#[test]
fn findings_span_pages() {
    let report = extract(vec![
        page(&[
            "10. Security",
            "Total Score: 6 Obtained: 4",
            "10.1 CCTV recording No 0/2",
        ]),
        page(&[
            "2. Hygiene",
            "Total Score: 8 Obtained: 7",
            "2.1 Bins emptied Poor 2/3",
        ]),
    ]);

    let ids: Vec<&str> = report.non_compliances.iter().map(|f| f.id.as_str()).collect();
    assert_eq!(ids, vec!["2.1", "10.1"]);
    assert_eq!(report.non_compliances[0].page, 2);
    assert_eq!(report.non_compliances[1].page, 1);
    assert_eq!(report.total_points_lost(), 3);
}

// ---------------------------------------------------------------------------
// Un-numbered checklist falls back to 0/N scan
// ---------------------------------------------------------------------------
#[test]
fn checklist_without_numbers_uses_fallback() {
    let report = extract(vec![page(&[
        "Report On Harbour Street",
        "Points available 40",
        "Earned Score 34",
        "Maximum Score: 20",
        "Earned Score: 14",
        "Front of House",
        "Is the entrance free of litter? No 0/4",
        "Comments: flyers by the door",
        "Are trolleys returned to the bay? Yes 2/2",
    ])]);

    assert_eq!(report.info.store_name, "Harbour Street");
    assert_eq!(report.info.total_score, dec!(40));
    assert_eq!(report.info.current_score, dec!(34));
    assert_eq!(report.info.percentage, dec!(85));

    assert_eq!(report.non_compliances.len(), 1);
    let f = &report.non_compliances[0];
    assert_eq!(f.id, "1");
    assert_eq!(f.section, "Front of House");
    assert_eq!(f.question, "Is the entrance free of litter?");
    assert_eq!(f.points_lost, 4);
    assert_eq!(f.max_points, 4);
    assert_eq!(f.auditor_comments, "flyers by the door");
}

#[test]
fn fallback_disabled_by_config() {
    let source = MockSource {
        pages: vec![page(&["Is the entrance free of litter? No 0/4"])],
    };
    let config = EngineConfig {
        unnumbered_fallback: false,
        ..Default::default()
    };
    let report = parse_pdf(&[], &source, &config).unwrap();
    assert!(report.non_compliances.is_empty());
}

#[test]
fn empty_document_is_not_an_error() {
    let report = extract(vec![]);
    assert_eq!(report, granska_core::model::AuditReport::default());
}

#[test]
fn source_errors_propagate() {
    let err = parse_pdf(&[], &FailingSource, &EngineConfig::default()).unwrap_err();
    assert!(matches!(err, GranskaError::PdftotextNotFound));
}

#[test]
fn repeated_question_id_keeps_its_own_section_scores() {
    let report = extract(vec![page(&[
        "2. Access Control",
        "Total Score: 20 Obtained: 15",
        "2.1 Door locks checked Poor 1/3",
        "3. Cash Handling",
        "Total Score: 10 Obtained: 10",
        "2.1 Safe closed Yes 5/5",
    ])]);

    assert_eq!(report.non_compliances.len(), 1);
    let f = &report.non_compliances[0];
    assert_eq!(f.question, "Door locks checked");
    assert_eq!(f.section, "Access Control");
    assert_eq!(f.section_total, dec!(20));
    assert_eq!(f.section_obtained, dec!(15));
}

#[test]
fn oversized_line_limits_from_config_are_safe() {
    let config = parse_config_str(r#"{"comment_max_lines": 18446744073709551615}"#).unwrap();
    let lines = vec![
        Line::from_text("1.1 Door locked Poor 1/3", 1, 0.0),
        Line::from_text("Comments: broken", 1, 10.0),
    ];
    let report = extract_from_lines(&lines, &config);
    assert_eq!(report.non_compliances.len(), 1);
    assert_eq!(report.non_compliances[0].auditor_comments, "broken");
}

// ---------------------------------------------------------------------------
// Extracting the same fragments twice gives the same report
// ---------------------------------------------------------------------------
const ROWS: &[&str] = &[
    "2. Access Control",
    "Total Score: 20 Obtained: 15",
    "2.1 Door locks checked Poor 1/3",
    "2.2 Alarm tested Good 5/5",
    "Comments: lock broken",
    "- follow up next visit",
    "Are floors clean? No 0/5",
    "Maximum Score: 20",
    "Summary",
    "170 180 90% 2% ↑",
    "Total 200 200",
    "Store Name: Riverside Mall",
    "Current Score : 184",
];

proptest! {
    #[test]
    fn extraction_is_deterministic(
        rows in prop::collection::vec(prop::sample::select(ROWS), 0..20),
    ) {
        let pages = vec![page(&rows)];
        prop_assert_eq!(extract_report(&pages), extract_report(&pages));
    }
}

#[test]
fn report_serializes_with_camel_case_findings_key() {
    let report = extract(vec![page(&["1.1 Floor clean No 0/2"])]);
    let json = serde_json::to_value(&report).unwrap();
    assert!(json.get("info").is_some());
    assert_eq!(json["nonCompliances"][0]["id"], "1.1");
    assert_eq!(json["nonCompliances"][0]["points_lost"], 2);
}

// ---------------------------------------------------------------------------
// Every numbered question below max becomes exactly one well-formed finding
// ---------------------------------------------------------------------------
proptest! {
    #[test]
    fn numbered_findings_are_well_formed(
        questions in prop::collection::btree_map(
            (1u32..10, 1u32..10),
            (0u32..10, 1u32..10),
            0..12,
        )
    ) {
        let lines: Vec<Line> = questions
            .iter()
            .enumerate()
            .map(|(i, ((major, minor), (obtained, max)))| {
                Line::from_text(
                    format!("{major}.{minor} Check item Good {obtained}/{max}"),
                    1,
                    i as f32 * 10.0,
                )
            })
            .collect();

        let report = extract_from_lines(&lines, &EngineConfig::default());

        let expected: Vec<String> = questions
            .iter()
            .filter(|(_, (obtained, max))| obtained < max)
            .map(|((major, minor), _)| format!("{major}.{minor}"))
            .collect();
        let ids: Vec<String> = report.non_compliances.iter().map(|f| f.id.clone()).collect();
        prop_assert_eq!(ids, expected);

        for f in &report.non_compliances {
            prop_assert!(f.points_lost >= 1);
            prop_assert!(f.points_lost <= f.max_points);
            prop_assert_eq!(f.question.as_str(), "Check item");
        }
    }
}
