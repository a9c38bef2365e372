use chrono::{DateTime, DurationRound, TimeDelta, Utc};

/// Timestamp format stored in the database (`2026-02-01T10:00:00Z`)
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Round a UTC time down to the start of its hour and format it for storage
pub fn floor_to_hour(time: DateTime<Utc>) -> String {
    let floored = time
        .duration_trunc(TimeDelta::hours(1))
        .unwrap_or(time);
    floored.format(TIMESTAMP_FORMAT).to_string()
}

/// Current UTC time floored to the hour
pub fn utc_now_floor() -> String {
    floor_to_hour(Utc::now())
}
