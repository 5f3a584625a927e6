//! Parser for individual `.eml` files (RFC 5322 messages without MBOX framing).

use std::path::Path;

use crate::error::{Result, SweepError};
use crate::model::record::RawRow;
use crate::parser::header;

/// Read a single `.eml` file and return its [`RawRow`].
///
/// Returns `Ok(None)` when the file holds no parseable headers.
pub fn parse_eml(path: impl AsRef<Path>) -> Result<Option<RawRow>> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|e| SweepError::open(path, e))?;
    let header_end = find_header_end(&data)
        .map(|end| end + 1)
        .unwrap_or(data.len());
    Ok(header::parse_headers_to_row(&data[..header_end]))
}

/// Byte offset of the first blank line (end of headers).
fn find_header_end(data: &[u8]) -> Option<usize> {
    data.windows(2)
        .position(|w| w == b"\n\n")
        .into_iter()
        .chain(data.windows(4).position(|w| w == b"\r\n\r\n"))
        .min()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_find_header_end() {
        let data = b"From: a@b.com\nSubject: Hi\n\nBody\n";
        assert_eq!(find_header_end(data), Some(25));
    }

    #[test]
    fn test_find_header_end_crlf() {
        let data = b"From: a@b.com\r\nSubject: Hi\r\n\r\nBody\r\n";
        assert_eq!(find_header_end(data), Some(26));
    }

    #[test]
    fn test_parse_eml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "From: Daily News <news@daily.example>\nSubject: Your Weekly Digest\nDate: Mon, 01 Jan 2024 08:00:00 +0000\n\nSubject: not a header\n"
        )
        .unwrap();
        let row = parse_eml(file.path()).unwrap().unwrap();
        assert_eq!(row.sender, "Daily News <news@daily.example>");
        assert_eq!(row.subject, "Your Weekly Digest");
    }
}
