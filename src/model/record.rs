//! Raw rows as captured from a source, and the normalized message record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::address::extract_email;
use crate::parser::date::parse_date;

/// Sender text used when a row carries no sender at all.
pub const UNKNOWN_SENDER: &str = "Unknown";

/// One message exactly as a source saw it, before any normalization.
///
/// Webmail snapshots fill these from the row's rendered text; MBOX and EML
/// sources fill them from the `From`, `Subject`, `Date` and
/// `List-Unsubscribe` headers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawRow {
    /// Sender as displayed (`"Name <addr>"`, a bare address, or only a name).
    pub sender: String,
    /// Subject as displayed.
    pub subject: String,
    /// Date text (title attribute, `datetime`, or header value).
    pub date: String,
    /// Whether the row exposes an unsubscribe link or header.
    pub has_unsubscribe: bool,
}

/// A normalized message, rebuilt on every scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageRecord {
    /// Position of the row within the scan (0, 1, 2, …).
    pub index: usize,
    /// Sender display text, trimmed; [`UNKNOWN_SENDER`] when missing.
    pub sender: String,
    /// Lowercased mailbox extracted from `sender`.
    pub sender_email: String,
    /// Lowercased subject.
    pub subject: String,
    /// Parsed date. Unparseable dates become the extraction time.
    pub date: DateTime<Utc>,
    /// Whether an unsubscribe marker was present.
    pub has_unsubscribe: bool,
}

impl MessageRecord {
    /// Normalize a raw row.
    ///
    /// `now` is the extraction clock; it stands in for any date that cannot be
    /// parsed, which keeps such records out of the "old" bucket.
    pub fn from_row(index: usize, row: &RawRow, now: DateTime<Utc>) -> Self {
        let sender = match row.sender.trim() {
            "" => UNKNOWN_SENDER.to_string(),
            s => s.to_string(),
        };
        let sender_email = extract_email(&sender);
        let date = parse_date(&row.date).unwrap_or(now);

        Self {
            index,
            sender,
            sender_email,
            subject: row.subject.trim().to_lowercase(),
            date,
            has_unsubscribe: row.has_unsubscribe,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_from_row_normalizes_fields() {
        let row = RawRow {
            sender: "  Shop <Promo@Shop.com> ".into(),
            subject: "50% OFF Everything".into(),
            date: "Thu, 04 Jan 2024 10:00:00 +0000".into(),
            has_unsubscribe: true,
        };
        let rec = MessageRecord::from_row(3, &row, now());
        assert_eq!(rec.index, 3);
        assert_eq!(rec.sender, "Shop <Promo@Shop.com>");
        assert_eq!(rec.sender_email, "promo@shop.com");
        assert_eq!(rec.subject, "50% off everything");
        assert_eq!(rec.date.format("%Y-%m-%d").to_string(), "2024-01-04");
        assert!(rec.has_unsubscribe);
    }

    #[test]
    fn test_missing_sender_is_unknown() {
        let rec = MessageRecord::from_row(0, &RawRow::default(), now());
        assert_eq!(rec.sender, UNKNOWN_SENDER);
        assert_eq!(rec.sender_email, "unknown");
        assert_eq!(rec.subject, "");
    }

    #[test]
    fn test_bad_date_defaults_to_now() {
        let row = RawRow {
            sender: "a@b.com".into(),
            date: "not a date at all".into(),
            ..Default::default()
        };
        let rec = MessageRecord::from_row(0, &row, now());
        assert_eq!(rec.date, now());
    }

    #[test]
    fn test_row_deserializes_with_missing_fields() {
        let row: RawRow = serde_json::from_str(r#"{"sender":"x@y.com"}"#).unwrap();
        assert_eq!(row.sender, "x@y.com");
        assert!(!row.has_unsubscribe);
    }
}
