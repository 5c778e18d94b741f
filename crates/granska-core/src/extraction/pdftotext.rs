use crate::error::GranskaError;
use crate::extraction::{Fragment, FragmentSource};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use std::io::Write;
use std::process::Command;

/// Fragment source backed by pdftotext (from poppler-utils).
///
/// Runs `pdftotext -bbox`, which reports every word with its bounding box
/// in top-left-origin page coordinates, and turns each word into a
/// [`Fragment`].
pub struct PdftotextSource;

impl PdftotextSource {
    pub fn new() -> Self {
        PdftotextSource
    }

    /// Check if pdftotext is available on the system.
    pub fn is_available() -> bool {
        Command::new("pdftotext")
            .arg("-v")
            .output()
            .map(|o| o.status.success() || !o.stderr.is_empty())
            .unwrap_or(false)
    }
}

impl Default for PdftotextSource {
    fn default() -> Self {
        Self::new()
    }
}

impl FragmentSource for PdftotextSource {
    fn extract_pages(&self, pdf_bytes: &[u8]) -> Result<Vec<Vec<Fragment>>, GranskaError> {
        let mut tmpfile =
            tempfile::NamedTempFile::new().map_err(|e| GranskaError::DocumentRead(e.to_string()))?;
        tmpfile
            .write_all(pdf_bytes)
            .map_err(|e| GranskaError::DocumentRead(e.to_string()))?;

        let output = Command::new("pdftotext")
            .arg("-bbox")
            .arg(tmpfile.path())
            .arg("-") // output to stdout
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    GranskaError::PdftotextNotFound
                } else {
                    GranskaError::DocumentRead(format!("pdftotext failed: {}", e))
                }
            })?;

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            return Err(GranskaError::PdftotextFailed { code, stderr });
        }

        let xml = String::from_utf8_lossy(&output.stdout);
        let pages = parse_bbox_xml(&xml)?;
        tracing::debug!(pages = pages.len(), "pdftotext extraction finished");
        Ok(pages)
    }

    fn backend_name(&self) -> &str {
        "pdftotext"
    }
}

/// Parse `pdftotext -bbox` XHTML into one fragment list per `<page>`.
fn parse_bbox_xml(xml: &str) -> Result<Vec<Vec<Fragment>>, GranskaError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut pages: Vec<Vec<Fragment>> = Vec::new();
    let mut current_page: Option<Vec<Fragment>> = None;
    let mut current_word: Option<(WordBox, String)> = None;

    loop {
        let event = reader.read_event().map_err(|e| {
            GranskaError::DocumentRead(format!(
                "malformed pdftotext output at byte {}: {}",
                reader.buffer_position(),
                e
            ))
        })?;

        match event {
            Event::Start(tag) => match tag.name().as_ref() {
                b"page" => current_page = Some(Vec::new()),
                b"word" => current_word = Some((parse_word_box(&tag)?, String::new())),
                _ => {}
            },
            Event::Empty(tag) if tag.name().as_ref() == b"page" => pages.push(Vec::new()),
            Event::Text(text) => {
                if let Some((_, word_text)) = current_word.as_mut() {
                    let unescaped = text
                        .unescape()
                        .map_err(|e| GranskaError::DocumentRead(e.to_string()))?;
                    word_text.push_str(&unescaped);
                }
            }
            Event::End(tag) => match tag.name().as_ref() {
                b"word" => {
                    if let (Some((bbox, text)), Some(page)) =
                        (current_word.take(), current_page.as_mut())
                    {
                        let text = text.trim();
                        if !text.is_empty() {
                            page.push(bbox.into_fragment(text));
                        }
                    }
                }
                b"page" => {
                    if let Some(page) = current_page.take() {
                        pages.push(page);
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(pages)
}

#[derive(Debug, Clone, Copy)]
struct WordBox {
    x_min: f32,
    y_min: f32,
    x_max: f32,
    y_max: f32,
}

impl WordBox {
    /// The bottom edge stands in for the baseline, so words of one visual
    /// line land in the same band even when their glyph heights differ.
    fn into_fragment(self, text: &str) -> Fragment {
        Fragment {
            text: text.to_string(),
            x: self.x_min,
            y: self.y_max,
            width: (self.x_max - self.x_min).max(0.0),
            height: (self.y_max - self.y_min).max(0.0),
        }
    }
}

fn parse_word_box(tag: &BytesStart<'_>) -> Result<WordBox, GranskaError> {
    Ok(WordBox {
        x_min: parse_attr_f32(tag, "xMin")?,
        y_min: parse_attr_f32(tag, "yMin")?,
        x_max: parse_attr_f32(tag, "xMax")?,
        y_max: parse_attr_f32(tag, "yMax")?,
    })
}

fn parse_attr_f32(tag: &BytesStart<'_>, name: &str) -> Result<f32, GranskaError> {
    let attr = tag
        .try_get_attribute(name)
        .map_err(|e| GranskaError::DocumentRead(e.to_string()))?
        .ok_or_else(|| GranskaError::DocumentRead(format!("word without {} attribute", name)))?;
    let value = attr
        .unescape_value()
        .map_err(|e| GranskaError::DocumentRead(e.to_string()))?;
    value.trim().parse().map_err(|_| {
        GranskaError::DocumentRead(format!("invalid {} value '{}'", name, value))
    })
}
