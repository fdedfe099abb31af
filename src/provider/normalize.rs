//! Unit normalization for provider payloads.
//!
//! Upstreams deliver a mix of plain numbers, suffix-scaled display strings
//! ("2.89T") and percent strings ("1.23%"). Adapters normalize everything to
//! numeric values before a quote leaves the provider layer.

use std::str::FromStr;

use rust_decimal::Decimal;

/// Parse a number that may carry a K/M/B/T scale suffix.
///
/// Accepts leading `$` and thousands separators. Returns `None` for
/// placeholder values ("N/A", "--", empty) and anything else that does not
/// parse, so callers fail closed instead of guessing.
pub fn parse_scaled_number(raw: &str) -> Option<Decimal> {
    let cleaned = raw.trim().trim_start_matches('$').replace(',', "");
    if cleaned.is_empty() || cleaned == "N/A" || cleaned == "--" {
        return None;
    }

    let (digits, multiplier) = match cleaned.chars().last() {
        Some('K') | Some('k') => (&cleaned[..cleaned.len() - 1], Decimal::from(1_000u64)),
        Some('M') | Some('m') => (&cleaned[..cleaned.len() - 1], Decimal::from(1_000_000u64)),
        Some('B') | Some('b') => (&cleaned[..cleaned.len() - 1], Decimal::from(1_000_000_000u64)),
        Some('T') | Some('t') => (
            &cleaned[..cleaned.len() - 1],
            Decimal::from(1_000_000_000_000u64),
        ),
        _ => (cleaned.as_str(), Decimal::ONE),
    };

    Decimal::from_str(digits).ok().map(|value| value * multiplier)
}

/// Parse a percent string like "1.23%" or "-0.4521%" into percent units.
pub fn parse_percent(raw: &str) -> Option<Decimal> {
    let cleaned = raw.trim().trim_end_matches('%');
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(cleaned).ok()
}
