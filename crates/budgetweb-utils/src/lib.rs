//! Utility functions and helpers

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

static ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a unique record ID
///
/// Millisecond timestamp followed by a process-wide counter, both in hex.
pub fn generate_id() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let seq = ID_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{:x}{:06x}", now, seq & 0xff_ffff)
}

/// Short English month name for a zero-based month number
pub fn month_name(month0: u32) -> Option<&'static str> {
    MONTH_NAMES.get(month0 as usize).copied()
}

/// Display label for a month, e.g. "Jan 2024"
pub fn month_label(year: i32, month0: u32) -> String {
    match month_name(month0) {
        Some(name) => format!("{} {}", name, year),
        None => format!("{}-{:02}", year, month0 + 1),
    }
}

/// Parse a label such as "Jan 2024" back into (year, zero-based month)
pub fn parse_month_label(label: &str) -> Option<(i32, u32)> {
    let mut parts = label.split_whitespace();
    let name = parts.next()?;
    let year = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    let month0 = MONTH_NAMES.iter().position(|m| *m == name)?;
    Some((year, month0 as u32))
}

/// True when `value` is longer than `max` characters
pub fn char_len_exceeds(value: &str, max: usize) -> bool {
    value.chars().count() > max
}
