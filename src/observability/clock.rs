//! Time source for log timestamps.

use std::fmt::Debug;

use chrono::{DateTime, FixedOffset, Local};

/// Supplies the current wall-clock time.
///
/// Production code uses [`SystemClock`]; tests inject [`FixedClock`] to get
/// byte-exact log lines.
pub trait Clock: Send + Sync + Debug {
    fn now(&self) -> DateTime<FixedOffset>;
}

/// Local system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// Always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<FixedOffset>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0
    }
}

/// Render a timestamp with millisecond precision and a numeric offset,
/// using `Z` for UTC (e.g. `2024-03-01T09:15:02.042+01:00`).
pub fn format_timestamp(ts: &DateTime<FixedOffset>) -> String {
    let offset = ts.offset().local_minus_utc();
    if offset == 0 {
        format!("{}Z", ts.format("%Y-%m-%dT%H:%M:%S%.3f"))
    } else {
        ts.format("%Y-%m-%dT%H:%M:%S%.3f%:z").to_string()
    }
}
