// src/duration.rs

//! Elapsed-time literals such as `300ms`, `1.5h` or `2h45m`.

use std::time::Duration;

/// Parse a non-negative elapsed-time literal.
///
/// The literal is a sequence of decimal numbers, each with an optional
/// fraction and a unit: `ns`, `us` (or `µs`), `ms`, `s`, `m`, `h`. A bare
/// `0` is accepted as "no time at all".
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }
    if s == "0" {
        return Ok(Duration::ZERO);
    }
    if s.starts_with('-') {
        return Err(format!("duration must be non-negative: {s}"));
    }
    let s = s.strip_prefix('+').unwrap_or(s);

    let mut total_nanos: f64 = 0.0;
    let mut rest = s;

    while !rest.is_empty() {
        let num_end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .ok_or_else(|| format!("missing unit in duration {s:?}"))?;
        let (num_part, tail) = rest.split_at(num_end);
        if num_part.is_empty() || num_part == "." {
            return Err(format!("invalid duration {s:?}"));
        }
        let value: f64 = num_part
            .parse()
            .map_err(|e| format!("invalid duration number '{num_part}': {e}"))?;

        let unit_end = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, next) = tail.split_at(unit_end);

        let scale = match unit {
            "ns" => 1.0,
            "us" | "µs" | "μs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60.0 * 1e9,
            "h" => 3600.0 * 1e9,
            other => {
                return Err(format!(
                    "unknown unit '{other}' in duration {s:?}; expected ns, us, ms, s, m, or h"
                ));
            }
        };

        total_nanos += value * scale;
        rest = next;
    }

    if !total_nanos.is_finite() || total_nanos > u64::MAX as f64 {
        return Err(format!("duration out of range: {s:?}"));
    }
    Ok(Duration::from_nanos(total_nanos.round() as u64))
}
