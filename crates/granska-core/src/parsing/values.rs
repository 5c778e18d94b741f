use regex::Regex;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;
use std::sync::LazyLock;

static NUMBER_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\d.]+").expect("number token regex"));
static SCORE_PAIR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s*/\s*(\d+)").expect("score pair regex"));
static PERCENT_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([\d.]+)%").expect("percent regex"));

/// All runs of digits and dots in `s`, in order.
///
/// Stray dots (as in `"2. Access"`) come through as tokens too; they parse
/// to nothing and count as zero.
pub fn number_tokens(s: &str) -> Vec<&str> {
    NUMBER_TOKEN.find_iter(s).map(|m| m.as_str()).collect()
}

/// Parse a number the way a loose report reader would:
///
/// - "192.0" -> 192
/// - "1.2.3" -> 1.2 (stops at the second dot)
/// - ".5" -> 0.5
/// - "." -> None
pub fn parse_number(token: &str) -> Option<Decimal> {
    let token = token.trim();
    let end = token
        .char_indices()
        .filter(|(_, c)| *c == '.')
        .nth(1)
        .map(|(i, _)| i)
        .unwrap_or(token.len());
    let head = token[..end].trim_end_matches('.');

    if !head.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let normalized = if head.starts_with('.') {
        format!("0{head}")
    } else {
        head.to_string()
    };
    Decimal::from_str(&normalized).ok().map(|d| d.normalize())
}

/// [`parse_number`], with unparseable input counting as zero.
pub fn number_or_zero(token: &str) -> Decimal {
    parse_number(token).unwrap_or_default()
}

/// First `obtained/max` pair in `s`.
pub fn score_pair(s: &str) -> Option<(u32, u32)> {
    let caps = SCORE_PAIR.captures(s)?;
    let obtained = caps[1].parse().ok()?;
    let max = caps[2].parse().ok()?;
    Some((obtained, max))
}

pub fn has_score_pair(s: &str) -> bool {
    SCORE_PAIR.is_match(s)
}

/// First `N%` value in `s`, as a number.
pub fn percent_value(s: &str) -> Option<Decimal> {
    PERCENT_VALUE
        .captures(s)
        .map(|caps| number_or_zero(&caps[1]))
}

/// `part / whole` as a percentage rounded to two decimals, or zero when
/// `whole` is not positive.
pub fn percent(part: Decimal, whole: Decimal) -> Decimal {
    if whole <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    part.checked_div(whole)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .map(|p| {
            p.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
                .normalize()
        })
        .unwrap_or_default()
}
