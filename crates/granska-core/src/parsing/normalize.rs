use regex::Regex;
use std::sync::LazyLock;

static TRAILING_CONJUNCTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s+(?:and|&|or)\s*$").expect("conjunction regex"));

/// Collapse every run of whitespace to a single space and trim.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncate to at most `max_chars` characters, ending in `...` when cut.
pub fn truncate_with_ellipsis(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let mut out: String = s.chars().take(keep).collect();
    out.push_str("...");
    out
}

/// Drop a word or word pair that is immediately repeated.
///
/// Stitching wrapped lines back together often doubles the words at the
/// seam ("checked daily checked daily"). Matching is case-insensitive and
/// prefers the two-word repeat over the one-word repeat. Punctuation
/// trailing the dropped repeat is kept.
pub fn dedupe_repeated_words(s: &str) -> String {
    let tokens: Vec<&str> = s.split_whitespace().collect();
    let mut out: Vec<String> = Vec::with_capacity(tokens.len());
    let mut i = 0;

    while i < tokens.len() {
        let span = [2, 1]
            .into_iter()
            .find(|&n| repeats_at(&tokens, i, n));

        match span {
            Some(n) => {
                out.extend(tokens[i..i + n].iter().map(|t| t.to_string()));
                let trailing = trailing_punctuation(tokens[i + 2 * n - 1]);
                if let Some(last) = out.last_mut() {
                    last.push_str(trailing);
                }
                i += 2 * n;
            }
            None => {
                out.push(tokens[i].to_string());
                i += 1;
            }
        }
    }

    out.join(" ")
}

/// Whether `tokens[i..i+n]` is followed directly by the same `n` words.
///
/// The first group must be bare words; the last word of the repeat may
/// carry trailing punctuation.
fn repeats_at(tokens: &[&str], i: usize, n: usize) -> bool {
    if i + 2 * n > tokens.len() {
        return false;
    }
    (0..n).all(|k| {
        let first = tokens[i + k];
        let second = tokens[i + n + k];
        let second_core = if k == n - 1 {
            word_core(second)
        } else {
            second
        };
        is_word(first) && is_word(second_core) && first.eq_ignore_ascii_case(second_core)
    })
}

fn is_word(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_alphanumeric() || c == '_')
}

fn word_core(s: &str) -> &str {
    s.trim_end_matches(|c: char| !(c.is_alphanumeric() || c == '_'))
}

fn trailing_punctuation(s: &str) -> &str {
    &s[word_core(s).len()..]
}

/// Remove a dangling `and`, `&` or `or` left behind by a wrapped heading.
pub fn strip_trailing_conjunction(s: &str) -> String {
    TRAILING_CONJUNCTION.replace(s, "").trim().to_string()
}
