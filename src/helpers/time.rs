use chrono::{DateTime, Utc};
use tokio::time::Instant;

/// Issuer wire format, e.g. `2024-05-01T09:15:02.123Z`
const REQUEST_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

pub fn now_i64() -> i64 {
    Utc::now().timestamp()
}

pub fn get_instant() -> Instant {
    Instant::now()
}

pub fn utc_request_time() -> String {
    format_request_time(Utc::now())
}

pub fn format_request_time(at: DateTime<Utc>) -> String {
    at.format(REQUEST_TIME_FORMAT).to_string()
}
