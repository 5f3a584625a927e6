//! Streaming MBOX header reader.
//!
//! Reads MBOX files line-by-line through a buffered reader and hands the
//! header block of each message to a callback. Bodies are skipped. Tolerant
//! of malformed input.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{Result, SweepError};

/// Size of the internal read buffer.
const READ_BUFFER_SIZE: usize = 256 * 1024;

/// Header blocks larger than this are truncated (pathological input).
const MAX_HEADER_SIZE: usize = 1024 * 1024;

/// Streaming MBOX reader.
///
/// Tolerates mixed `\n`/`\r\n` line endings, `From ` lines not preceded by a
/// blank line (logged), truncated messages at EOF and a UTF-8 BOM.
pub struct MboxReader {
    path: PathBuf,
    file_size: u64,
}

impl MboxReader {
    /// Open a reader for the given MBOX file.
    ///
    /// Verifies that the file exists, but does NOT validate that it is an MBOX.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let metadata = std::fs::metadata(&path).map_err(|e| SweepError::open(&path, e))?;
        Ok(Self {
            path,
            file_size: metadata.len(),
        })
    }

    /// Path to the MBOX file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Walk every message, calling `header_callback` with its header bytes.
    ///
    /// The header bytes include the `From ` separator line. The callback
    /// returns `false` to stop early. Returns the number of messages visited.
    pub fn for_each_header(&self, header_callback: &mut dyn FnMut(&[u8]) -> bool) -> Result<u64> {
        if self.file_size == 0 {
            return Ok(0);
        }

        let file = File::open(&self.path).map_err(|e| SweepError::io(&self.path, e))?;
        let mut reader = BufReader::with_capacity(READ_BUFFER_SIZE, file);

        let mut count: u64 = 0;
        let mut offset: u64 = 0;
        let mut header_buf: Vec<u8> = Vec::with_capacity(16 * 1024);
        let mut line_buf: Vec<u8> = Vec::with_capacity(4096);
        let mut in_headers = false;
        let mut have_message = false;
        let mut prev_line_was_empty = true;

        loop {
            line_buf.clear();
            let line_len = reader
                .read_until(b'\n', &mut line_buf)
                .map_err(|e| SweepError::io(&self.path, e))?;
            if line_len == 0 {
                break;
            }

            if is_mbox_separator(&line_buf) {
                if !prev_line_was_empty && have_message {
                    warn!(offset, "Found 'From ' separator without preceding blank line");
                }
                if have_message {
                    count += 1;
                    if !header_callback(&header_buf) {
                        return Ok(count);
                    }
                }
                header_buf.clear();
                header_buf.extend_from_slice(&line_buf);
                in_headers = true;
                have_message = true;
            } else if in_headers {
                if is_blank_line(&line_buf) {
                    in_headers = false;
                } else if header_buf.len() + line_buf.len() <= MAX_HEADER_SIZE {
                    header_buf.extend_from_slice(&line_buf);
                }
            }

            prev_line_was_empty = is_blank_line(&line_buf);
            offset += line_len as u64;
        }

        if have_message {
            count += 1;
            header_callback(&header_buf);
        }

        debug!(path = %self.path.display(), count, "Finished reading MBOX headers");
        Ok(count)
    }
}

/// Check whether a line is an MBOX separator (`From ` at the start).
fn is_mbox_separator(line: &[u8]) -> bool {
    let line = line.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(line);
    line.starts_with(b"From ")
}

/// Check whether a line is blank (empty or only whitespace / CR / LF).
fn is_blank_line(line: &[u8]) -> bool {
    line.iter()
        .all(|&b| b == b'\n' || b == b'\r' || b == b' ' || b == b'\t')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_is_mbox_separator() {
        assert!(is_mbox_separator(
            b"From user@example.com Thu Jan 01 00:00:00 2024\n"
        ));
        assert!(!is_mbox_separator(b"from user@example.com\n"));
        assert!(!is_mbox_separator(b">From user@example.com\n"));
        assert!(!is_mbox_separator(b"Subject: From here\n"));
    }

    #[test]
    fn test_is_mbox_separator_with_bom() {
        let mut line = vec![0xEF, 0xBB, 0xBF];
        line.extend_from_slice(b"From user@example.com Thu Jan 01 00:00:00 2024\n");
        assert!(is_mbox_separator(&line));
    }

    #[test]
    fn test_is_blank_line() {
        assert!(is_blank_line(b"\n"));
        assert!(is_blank_line(b"\r\n"));
        assert!(!is_blank_line(b"hello\n"));
    }

    #[test]
    fn test_headers_exclude_body() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "From a@b.com Thu Jan 04 10:00:00 2024\nSubject: One\n\nBody line\n>From escaped\n\nFrom c@d.com Fri Jan 05 10:00:00 2024\r\nSubject: Two\r\n\r\nBody\r\n"
        )
        .unwrap();

        let reader = MboxReader::new(file.path()).unwrap();
        let mut blocks: Vec<String> = Vec::new();
        let count = reader
            .for_each_header(&mut |h| {
                blocks.push(String::from_utf8_lossy(h).into_owned());
                true
            })
            .unwrap();

        assert_eq!(count, 2);
        assert!(blocks[0].contains("Subject: One"));
        assert!(!blocks[0].contains("Body line"));
        assert!(blocks[1].contains("Subject: Two"));
    }

    #[test]
    fn test_stop_early() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "From a Thu Jan 04 10:00:00 2024\nSubject: 1\n\nx\n\nFrom b Thu Jan 04 10:00:00 2024\nSubject: 2\n\ny\n"
        )
        .unwrap();
        let reader = MboxReader::new(file.path()).unwrap();
        let count = reader.for_each_header(&mut |_| false).unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            MboxReader::new("/definitely/not/here.mbox"),
            Err(SweepError::FileNotFound(_))
        ));
    }
}
