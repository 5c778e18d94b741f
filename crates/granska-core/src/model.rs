use crate::parsing::values::percent;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Header metadata and the overall score summary of one audit.
///
/// Every field defaults to empty/zero; absence of a value in the source
/// document is not an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportInfo {
    pub store_name: String,
    pub reference_id: String,
    pub visit_date: String,
    pub last_visit_date: String,
    pub store_manager: String,
    pub area_manager: String,
    pub submitted_by: String,
    pub reviewed_by: String,
    pub current_score: Decimal,
    pub total_score: Decimal,
    pub previous_score: Decimal,
    pub percentage: Decimal,
    /// Signed change against the previous visit, e.g. `"-2.5%"`.
    pub difference: String,
}

impl ReportInfo {
    /// Previous score as a percentage of the current total.
    pub fn previous_percentage(&self) -> Decimal {
        percent(self.previous_score, self.total_score)
    }

    pub fn has_previous(&self) -> bool {
        self.previous_score > Decimal::ZERO
    }
}

/// A question that scored below its maximum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NonComplianceFinding {
    /// `"major.minor"` for numbered questions, a running count otherwise.
    pub id: String,
    pub section: String,
    pub question: String,
    pub points_lost: u32,
    pub max_points: u32,
    pub section_obtained: Decimal,
    pub section_total: Decimal,
    pub section_percentage: Decimal,
    pub auditor_comments: String,
    /// 1-based page of the question line.
    pub page: usize,
    pub y_position: f32,
}

impl NonComplianceFinding {
    pub fn obtained_points(&self) -> u32 {
        self.max_points.saturating_sub(self.points_lost)
    }
}

/// The structured record recovered from one audit document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditReport {
    pub info: ReportInfo,
    #[serde(rename = "nonCompliances")]
    pub non_compliances: Vec<NonComplianceFinding>,
}

impl AuditReport {
    pub fn total_points_lost(&self) -> u32 {
        self.non_compliances.iter().map(|nc| nc.points_lost).sum()
    }
}
