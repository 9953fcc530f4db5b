//! Human-readable durations for error messages.

use std::time::Duration;

const UNITS: [(&str, u64); 4] = [("day", 86_400), ("hour", 3_600), ("minute", 60), ("second", 1)];

/// Render `duration` as words, e.g. `1 hour 2 minutes 5 seconds`.
///
/// Zero components are skipped and sub-second remainders are dropped, except
/// for durations under one second which are rendered in milliseconds.
pub fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    if total_secs == 0 {
        return plural(duration.subsec_millis().into(), "millisecond");
    }

    let mut remaining = total_secs;
    let mut parts = Vec::new();
    for (unit, size) in UNITS {
        let count = remaining / size;
        remaining %= size;
        if count > 0 {
            parts.push(plural(count, unit));
        }
    }
    parts.join(" ")
}

fn plural(count: u64, unit: &str) -> String {
    if count == 1 {
        format!("{} {}", count, unit)
    } else {
        format!("{} {}s", count, unit)
    }
}
