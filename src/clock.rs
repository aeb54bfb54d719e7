//! Timestamp helpers shared by handlers and integrations

use chrono::{DateTime, Local, Utc};
use std::time::Duration;

/// Local time in ISO-8601 with microseconds and no offset, e.g. `2025-01-15T10:30:00.123456`
pub fn iso_now() -> String {
    iso_local(&Local::now())
}

pub fn iso_local(time: &DateTime<Local>) -> String {
    time.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}

/// UTC instant at second precision, e.g. `2025-01-15T08:00:00Z`
pub fn iso_utc(time: &DateTime<Utc>) -> String {
    time.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Render an uptime as hours and minutes, e.g. `24h 15m`
pub fn format_uptime(uptime: Duration) -> String {
    let minutes = uptime.as_secs() / 60;
    format!("{}h {}m", minutes / 60, minutes % 60)
}
