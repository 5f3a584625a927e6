//! Date parsing for header values and webmail row timestamps.
//!
//! Webmail rows expose dates in whatever form the provider renders
//! (`"Thu, Jan 4, 2024, 10:00 AM"` in a title attribute, an ISO `datetime`
//! attribute, or a bare `"1/4/2024"`), so the accepted set is deliberately wide.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use tracing::debug;

/// Formats with an explicit offset or zone.
const ZONED_FORMATS: &[&str] = &[
    "%d %b %Y %H:%M:%S %z",
    "%d %b %Y %H:%M %z",
    "%Y-%m-%dT%H:%M:%S%z",
    "%Y-%m-%d %H:%M:%S %z",
];

/// Formats without zone information; interpreted as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%d %b %Y %H:%M:%S",
    "%b %d %H:%M:%S %Y",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%b %d, %Y, %I:%M %p",
    "%b %d, %Y %I:%M %p",
    "%B %d, %Y, %I:%M %p",
    "%B %d, %Y %I:%M %p",
    "%d %b %Y, %H:%M",
    "%m/%d/%Y %I:%M %p",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Date-only formats; the time is taken as midnight UTC.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%b %d, %Y", "%B %d, %Y", "%d %b %Y", "%m/%d/%Y"];

/// Parse a date string in the forms found in mail headers and webmail rows.
///
/// Returns `None` for empty or unrecognized input; callers pick the fallback.
pub fn parse_date(date_str: &str) -> Option<DateTime<Utc>> {
    let cleaned = normalize_spaces(date_str);
    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    let no_dow = strip_day_of_week(trimmed);
    let normalized = normalize_imap_date(&no_dow);

    for candidate in [&no_dow, &normalized, &replace_named_tz(&no_dow)] {
        if let Some(dt) = try_formats(candidate) {
            return Some(dt);
        }
    }

    if let Some(dt) = mail_parser_date(trimmed) {
        return Some(dt);
    }

    debug!(date = trimmed, "Could not parse date");
    None
}

fn try_formats(candidate: &str) -> Option<DateTime<Utc>> {
    for fmt in ZONED_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(candidate, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(candidate, fmt) {
            return Some(Utc.from_utc_datetime(&ndt));
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(candidate, fmt) {
            return d
                .and_hms_opt(0, 0, 0)
                .map(|ndt| Utc.from_utc_datetime(&ndt));
        }
    }
    None
}

/// Last resort: let `mail-parser` read it as a `Date:` header.
fn mail_parser_date(input: &str) -> Option<DateTime<Utc>> {
    use mail_parser::MessageParser;

    let fake_msg = format!("Date: {input}\n\n");
    let parsed = MessageParser::default().parse(fake_msg.as_bytes())?;
    let dt = parsed.date()?.to_rfc3339();
    DateTime::parse_from_rfc3339(&dt)
        .ok()
        .map(|d| d.with_timezone(&Utc))
}

/// Providers render `"10:00\u{202f}AM"` and `"Jan\u{a0}4"`; fold those to plain spaces.
fn normalize_spaces(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '\u{00a0}' | '\u{202f}' | '\u{2009}' => ' ',
            _ => c,
        })
        .collect()
}

/// `"16-JUL-2025 03:01:03"` → `"16 Jul 2025 03:01:03"`.
fn normalize_imap_date(s: &str) -> String {
    if !s.contains('-') {
        return s.to_string();
    }

    const MONTHS: [&str; 12] = [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ];

    for month in MONTHS {
        for variant in [month.to_uppercase(), month.to_lowercase()] {
            let pattern = format!("-{variant}-");
            if s.contains(&pattern) {
                return s.replacen(&pattern, &format!(" {month} "), 1);
            }
        }
    }
    s.to_string()
}

/// Strip a leading day-of-week (`"Thu, "`, `"Thu "`, `"Thursday, "`).
fn strip_day_of_week(s: &str) -> String {
    const DAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
    for day in DAYS {
        if let Some(rest) = s.strip_prefix(day) {
            // Full names: "Thursday", "Tuesday", ...
            let rest = match rest.find([',', ' ']) {
                Some(pos) if rest[..pos].chars().all(|c| c.is_ascii_alphabetic()) => &rest[pos..],
                _ => rest,
            };
            if let Some(rest) = rest.strip_prefix(',').or_else(|| rest.strip_prefix(' ')) {
                return rest.trim().to_string();
            }
        }
    }
    s.to_string()
}

/// Replace a trailing zone abbreviation with its numeric offset.
fn replace_named_tz(s: &str) -> String {
    const ZONES: [(&str, &str); 13] = [
        ("CEST", "+0200"),
        ("EST", "-0500"),
        ("EDT", "-0400"),
        ("CST", "-0600"),
        ("CDT", "-0500"),
        ("MST", "-0700"),
        ("MDT", "-0600"),
        ("PST", "-0800"),
        ("PDT", "-0700"),
        ("GMT", "+0000"),
        ("UTC", "+0000"),
        ("CET", "+0100"),
        ("JST", "+0900"),
    ];
    for (name, offset) in ZONES {
        if let Some(head) = s.strip_suffix(name) {
            return format!("{head}{offset}");
        }
    }
    s.to_string()
}
