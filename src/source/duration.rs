//! Parsing for duration strings like "250ms", "2s", "1m".

use std::time::Duration;

/// Parses a number followed by an optional unit (`ns`, `us`, `ms`, `s`,
/// `m`, `h`). A bare number is seconds; an empty string is zero.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(Duration::ZERO);
    }

    // Find where the number ends and the unit begins
    let num_end = s
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(s.len());

    let (num_str, unit) = s.split_at(num_end);
    let num: f64 = num_str
        .parse()
        .map_err(|_| format!("invalid duration number: {num_str:?}"))?;

    let multiplier = match unit.trim() {
        "ns" => 1e-9,
        "us" | "µs" => 1e-6,
        "ms" => 1e-3,
        "s" | "" => 1.0,
        "m" => 60.0,
        "h" => 3600.0,
        other => return Err(format!("unknown duration unit: {other:?}")),
    };

    Duration::try_from_secs_f64(num * multiplier).map_err(|e| format!("duration out of range: {e}"))
}
