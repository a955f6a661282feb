//! Conditional request module
//!
//! `Last-Modified` formatting and `If-Modified-Since` evaluation. HTTP dates
//! have whole-second resolution, so file times are truncated before comparing.

use std::time::{SystemTime, UNIX_EPOCH};

/// Format a timestamp as an IMF-fixdate, e.g. `Sun, 06 Nov 1994 08:49:37 GMT`
pub fn format_http_date(time: SystemTime) -> String {
    httpdate::fmt_http_date(time)
}

/// Whether a GET for a file last modified at `modified` can be answered
/// with 304.
///
/// `If-None-Match` takes precedence over `If-Modified-Since`; since no
/// entity tags are issued, its presence disables the date check. An
/// unparseable date is ignored.
pub fn is_not_modified(
    if_modified_since: Option<&str>,
    has_if_none_match: bool,
    modified: SystemTime,
) -> bool {
    if has_if_none_match {
        return false;
    }
    let Some(since) = if_modified_since.and_then(|v| httpdate::parse_http_date(v.trim()).ok())
    else {
        return false;
    };

    match (unix_seconds(modified), unix_seconds(since)) {
        (Some(modified), Some(since)) => modified <= since,
        _ => false,
    }
}

fn unix_seconds(time: SystemTime) -> Option<u64> {
    time.duration_since(UNIX_EPOCH).ok().map(|d| d.as_secs())
}
