pub mod lines;
pub mod pdftotext;

use crate::error::GranskaError;
use serde::{Deserialize, Serialize};

/// A positioned run of text from one rendered page.
///
/// Coordinates are top-left origin: `y` grows downward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    pub text: String,
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub width: f32,
    #[serde(default)]
    pub height: f32,
}

impl Fragment {
    pub fn new(text: impl Into<String>, x: f32, y: f32) -> Self {
        Fragment {
            text: text.into(),
            x,
            y,
            width: 0.0,
            height: 0.0,
        }
    }
}

/// A reading-order row of text assembled from fragments sharing a vertical band.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Line {
    pub text: String,
    /// 1-based page number.
    pub page: usize,
    /// Quantized band position on the page.
    pub y: f32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fragments: Vec<Fragment>,
}

impl Line {
    /// Build a line directly from text, without fragment provenance.
    pub fn from_text(text: impl Into<String>, page: usize, y: f32) -> Self {
        Line {
            text: text.into(),
            page,
            y,
            fragments: Vec::new(),
        }
    }
}

/// Trait for document backends that yield positioned text fragments.
pub trait FragmentSource: Send + Sync {
    /// Extract fragments from document bytes, returning one list per page in document order.
    fn extract_pages(&self, pdf_bytes: &[u8]) -> Result<Vec<Vec<Fragment>>, GranskaError>;

    /// Name of this extraction backend (for diagnostics).
    fn backend_name(&self) -> &str;
}
