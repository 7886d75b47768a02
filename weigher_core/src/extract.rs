//! Field extraction from a completed candidate record.
//!
//! The scale transmits `i` + one identifier character + a whitespace run +
//! an 11-digit state+weight block. The magnitude lives in the first 5 digits
//! of that block; the sign is selected by the identifier character at record
//! offset 2 (`z` or `r` mean negative). Both halves of that derivation are
//! firmware framing and must not be "simplified".

use regex::Regex;
use std::sync::LazyLock;
use std::time::Instant;

static RECORD_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"i.\s+(\d{11})").expect("record pattern is valid"));

/// One validated weight reading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedReading {
    /// Signed weight in whole kilograms.
    pub weight_kg: i32,
    /// The raw candidate record the reading came from, for diagnostics.
    pub source_line: String,
    pub observed_at: Instant,
}

/// Extract the signed weight from a candidate record, or reject it.
///
/// Rejection is not an error; most noise lines and truncated records simply
/// fail the pattern.
pub fn extract_weight(line: &str) -> Option<i32> {
    let caps = RECORD_PATTERN.captures(line)?;
    let digits = caps.get(1)?.as_str();
    let magnitude: i32 = digits[..5].parse().ok()?;

    // Sign lives at a fixed offset in the record, not inside the matched
    // group: `z` and `r` are the firmware's below-zero state identifiers.
    let negative = matches!(line.as_bytes().get(2), Some(b'z') | Some(b'r'));
    Some(if negative { -magnitude } else { magnitude })
}

/// Build a [`ParsedReading`] from a candidate record, stamping it with the
/// observation time.
pub fn parse_record(line: &str, observed_at: Instant) -> Option<ParsedReading> {
    extract_weight(line).map(|weight_kg| ParsedReading {
        weight_kg,
        source_line: line.to_owned(),
        observed_at,
    })
}
