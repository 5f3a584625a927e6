//! Turning RFC 5322 header blocks into raw rows.

use mail_parser::MessageParser;
use tracing::warn;

use crate::model::record::RawRow;

/// Build a [`RawRow`] from the raw header bytes of one message.
///
/// Only `From`, `Subject`, `Date` and `List-Unsubscribe` are consulted; the
/// body is never read. Encoded-words and non-UTF-8 charsets are resolved by
/// `mail-parser`. Returns `None` when the block has no recognizable headers.
pub fn parse_headers_to_row(raw_headers: &[u8]) -> Option<RawRow> {
    let headers = skip_from_line(raw_headers);
    let Some(message) = MessageParser::default().parse(headers) else {
        warn!(len = headers.len(), "Header block could not be parsed");
        return None;
    };

    let sender = message
        .from()
        .and_then(|addrs| addrs.first())
        .map(|addr| match (addr.name(), addr.address()) {
            (Some(name), Some(address)) if !name.trim().is_empty() => {
                format!("{} <{}>", name.trim(), address)
            }
            (_, Some(address)) => address.to_string(),
            (Some(name), None) => name.trim().to_string(),
            (None, None) => String::new(),
        })
        .unwrap_or_default();

    let subject = message.subject().unwrap_or_default().to_string();

    let date = message
        .date()
        .map(|dt| dt.to_rfc3339())
        .or_else(|| raw_header_value(headers, "date"))
        .unwrap_or_default();

    Some(RawRow {
        sender,
        subject,
        date,
        has_unsubscribe: raw_header_value(headers, "list-unsubscribe").is_some(),
    })
}

/// Drop a leading MBOX `From ` separator line, if any.
pub fn skip_from_line(data: &[u8]) -> &[u8] {
    if data.starts_with(b"From ") {
        match data.iter().position(|&b| b == b'\n') {
            Some(pos) => &data[pos + 1..],
            None => &[],
        }
    } else {
        data
    }
}

/// First value of a header by lowercase name, with folded lines joined.
fn raw_header_value(headers: &[u8], name: &str) -> Option<String> {
    let text = String::from_utf8_lossy(headers);
    let mut found: Option<String> = None;

    for line in text.lines() {
        if line.is_empty() {
            break;
        }
        if line.starts_with(' ') || line.starts_with('\t') {
            if let Some(value) = found.as_mut() {
                value.push(' ');
                value.push_str(line.trim());
            }
            continue;
        }
        if found.is_some() {
            break;
        }
        if let Some((key, value)) = line.split_once(':') {
            if key.trim().eq_ignore_ascii_case(name) {
                found = Some(value.trim().to_string());
            }
        }
    }

    found.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_from_headers() {
        let raw = b"From: Shop Deals <promo@shop.com>\nSubject: 50% off today\nDate: Thu, 04 Jan 2024 10:00:00 +0000\nList-Unsubscribe: <mailto:unsub@shop.com>\n";
        let row = parse_headers_to_row(raw).unwrap();
        assert_eq!(row.sender, "Shop Deals <promo@shop.com>");
        assert_eq!(row.subject, "50% off today");
        assert!(row.date.starts_with("2024-01-04"));
        assert!(row.has_unsubscribe);
    }

    #[test]
    fn test_row_decodes_encoded_words() {
        let raw = b"From: =?UTF-8?B?Sm9zw6k=?= <jose@example.com>\nSubject: =?UTF-8?Q?Caf=C3=A9_weekly?=\n";
        let row = parse_headers_to_row(raw).unwrap();
        assert_eq!(row.sender, "Jos\u{e9} <jose@example.com>");
        assert_eq!(row.subject, "Caf\u{e9} weekly");
        assert!(!row.has_unsubscribe);
    }

    #[test]
    fn test_row_with_mbox_separator() {
        let raw = b"From sender@example.com Thu Jan 04 10:00:00 2024\nFrom: sender@example.com\nSubject: Hi\n";
        let row = parse_headers_to_row(raw).unwrap();
        assert_eq!(row.sender, "sender@example.com");
        assert_eq!(row.subject, "Hi");
        assert_eq!(row.date, "");
    }

    #[test]
    fn test_skip_from_line() {
        assert_eq!(skip_from_line(b"From x\nA: b\n"), b"A: b\n");
        assert_eq!(skip_from_line(b"A: b\n"), b"A: b\n");
    }

    #[test]
    fn test_raw_header_value_folded() {
        let raw = b"Subject: x\nList-Unsubscribe: <https://a.example/u>,\n <mailto:u@a.example>\nTo: y\n";
        assert_eq!(
            raw_header_value(raw, "list-unsubscribe").as_deref(),
            Some("<https://a.example/u>, <mailto:u@a.example>")
        );
        assert!(raw_header_value(raw, "cc").is_none());
    }
}
