use crate::extraction::{Fragment, Line};
use std::collections::BTreeMap;

/// Default height of the vertical band that counts as one visual line.
pub const DEFAULT_BAND_WIDTH: f32 = 5.0;

/// Group positioned fragments into reading-order lines.
///
/// Each fragment's Y is snapped to the nearest multiple of `band_width`, so
/// baseline jitter within one visual line collapses onto a single key.
/// Lines come out page by page, top to bottom; within a line fragments are
/// ordered left to right and joined with single spaces. The order in which
/// fragments arrive does not matter.
pub fn reconstruct_lines(pages: &[Vec<Fragment>], band_width: f32) -> Vec<Line> {
    let band_width = if band_width.is_finite() && band_width > 0.0 {
        band_width
    } else {
        DEFAULT_BAND_WIDTH
    };

    let mut lines = Vec::new();

    for (page_idx, fragments) in pages.iter().enumerate() {
        let mut bands: BTreeMap<i64, Vec<&Fragment>> = BTreeMap::new();

        for fragment in fragments {
            if fragment.text.trim().is_empty() || !fragment.x.is_finite() || !fragment.y.is_finite()
            {
                continue;
            }
            bands
                .entry(band_key(fragment.y, band_width))
                .or_default()
                .push(fragment);
        }

        for (key, mut band) in bands {
            band.sort_by(|a, b| a.x.total_cmp(&b.x));

            let text = band
                .iter()
                .map(|f| f.text.trim())
                .collect::<Vec<_>>()
                .join(" ")
                .trim()
                .to_string();
            if text.is_empty() {
                continue;
            }

            lines.push(Line {
                text,
                page: page_idx + 1,
                y: key as f32 * band_width,
                fragments: band.into_iter().cloned().collect(),
            });
        }
    }

    lines
}

/// Join line texts with newlines, giving the flattened document text.
pub fn full_text(lines: &[Line]) -> String {
    lines
        .iter()
        .map(|l| l.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Round half up, so 2.5 lands in band 3 and -2.5 in band -2.
fn band_key(y: f32, band_width: f32) -> i64 {
    (f64::from(y) / f64::from(band_width) + 0.5).floor() as i64
}
