//! Prometheus-style duration strings: `1h30m`, `5m`, `250ms`, `2w`.

use std::time::Duration;

/// Units in the order they must appear, with their length in milliseconds.
const UNITS: [(&str, u64); 7] = [
    ("y", 365 * 24 * 60 * 60 * 1000),
    ("w", 7 * 24 * 60 * 60 * 1000),
    ("d", 24 * 60 * 60 * 1000),
    ("h", 60 * 60 * 1000),
    ("m", 60 * 1000),
    ("s", 1000),
    ("ms", 1),
];

/// Parses a duration made of `<digits><unit>` groups, units from largest to
/// smallest, each at most once.
///
/// ```
/// use std::time::Duration;
/// use anomon_engine::duration::parse_duration;
///
/// assert_eq!(parse_duration("1h30m").unwrap(), Duration::from_secs(5400));
/// assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
/// assert!(parse_duration("30m1h").is_err());
/// assert!(parse_duration("5").is_err());
/// ```
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    if s.is_empty() {
        return Err("empty duration".to_string());
    }

    let mut rest = s;
    let mut next_unit = 0;
    let mut total_ms: u64 = 0;
    while !rest.is_empty() {
        let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
        if digits == 0 {
            return Err(format!("expected a number in {s:?}"));
        }
        let value: u64 = rest[..digits]
            .parse()
            .map_err(|_| format!("number out of range in {s:?}"))?;
        rest = &rest[digits..];

        let unit_len = rest
            .bytes()
            .take_while(|b| b.is_ascii_alphabetic())
            .count();
        let unit = &rest[..unit_len];
        let pos = UNITS[next_unit..]
            .iter()
            .position(|(name, _)| *name == unit)
            .ok_or_else(|| format!("unknown or out-of-order unit {unit:?} in {s:?}"))?;
        let (_, unit_ms) = UNITS[next_unit + pos];
        next_unit += pos + 1;
        rest = &rest[unit_len..];

        total_ms = value
            .checked_mul(unit_ms)
            .and_then(|ms| total_ms.checked_add(ms))
            .ok_or_else(|| format!("duration {s:?} overflows"))?;
    }
    Ok(Duration::from_millis(total_ms))
}

/// Like [`parse_duration`] but rejects a zero interval.
pub fn parse_positive_duration(s: &str) -> Result<Duration, String> {
    let d = parse_duration(s)?;
    if d.is_zero() {
        return Err(format!("duration {s:?} is not positive"));
    }
    Ok(d)
}
