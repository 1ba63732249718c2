use chrono::{DateTime, SecondsFormat, Utc};

/// Current server time in UTC.
pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}

/// Format a timestamp the way it appears on the wire (RFC 3339, milliseconds, `Z`).
pub fn to_rfc3339(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}
