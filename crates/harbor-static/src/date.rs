//! HTTP-date formatting and parsing (IMF-fixdate, RFC 850, asctime).

use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, NaiveDateTime, Utc};

const IMF_FIXDATE: &str = "%a, %d %b %Y %H:%M:%S GMT";
const RFC_850: &str = "%A, %d-%b-%y %H:%M:%S GMT";
const ASCTIME: &str = "%a %b %e %H:%M:%S %Y";

/// Format as an IMF-fixdate, e.g. `Sun, 06 Nov 1994 08:49:37 GMT`.
pub fn format_http_date(time: SystemTime) -> String {
    DateTime::<Utc>::from(time).format(IMF_FIXDATE).to_string()
}

/// Parse any of the three HTTP-date forms. Returns whole seconds since the
/// Unix epoch.
pub fn parse_http_date(raw: &str) -> Option<i64> {
    let raw = raw.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc2822(raw) {
        return Some(parsed.timestamp());
    }

    [RFC_850, ASCTIME]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc().timestamp())
}

/// Whole seconds since the Unix epoch; HTTP dates carry no sub-second
/// precision, so comparisons use this.
pub fn unix_seconds(time: SystemTime) -> i64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(after) => i64::try_from(after.as_secs()).unwrap_or(i64::MAX),
        Err(before) => -i64::try_from(before.duration().as_secs()).unwrap_or(i64::MAX),
    }
}
