//! Record extraction: row sources and their normalization into [`MessageRecord`]s.
//!
//! A [`RowSource`] is anything that can produce the raw rows of an inbox. The
//! classifier never sees a source directly; [`extract`] turns rows into
//! records, skipping blank rows instead of failing the scan.

pub mod provider;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::model::record::{MessageRecord, RawRow};
use crate::parser::eml::parse_eml;
use crate::parser::header::parse_headers_to_row;
use crate::parser::mbox::MboxReader;
use crate::parser::snapshot::PageSnapshot;

pub use provider::Provider;

/// Produces the raw rows of one inbox view.
pub trait RowSource {
    /// Short label for logs.
    fn label(&self) -> String;

    /// Read every row, in display order.
    fn read_rows(&mut self) -> Result<Vec<RawRow>>;

    /// When the rows were captured, if the source knows.
    fn captured_at(&self) -> Option<DateTime<Utc>> {
        None
    }
}

/// Normalize every non-blank row from `source` into a record.
///
/// Records are numbered by their position among the kept rows.
pub fn extract(source: &mut dyn RowSource, now: DateTime<Utc>) -> Result<Vec<MessageRecord>> {
    let rows = source.read_rows()?;
    let total = rows.len();

    let records: Vec<MessageRecord> = rows
        .iter()
        .enumerate()
        .filter(|(i, row)| {
            let blank = is_blank(row);
            if blank {
                debug!(row = i, "Skipping blank row");
            }
            !blank
        })
        .enumerate()
        .map(|(index, (_, row))| MessageRecord::from_row(index, row, now))
        .collect();

    info!(
        source = %source.label(),
        rows = total,
        records = records.len(),
        "Extracted message records"
    );
    Ok(records)
}

fn is_blank(row: &RawRow) -> bool {
    row.sender.trim().is_empty() && row.subject.trim().is_empty() && row.date.trim().is_empty()
}

// ── Sources ─────────────────────────────────────────────────────

impl RowSource for Vec<RawRow> {
    fn label(&self) -> String {
        format!("{} in-memory rows", self.len())
    }

    fn read_rows(&mut self) -> Result<Vec<RawRow>> {
        Ok(self.clone())
    }
}

impl RowSource for PageSnapshot {
    fn label(&self) -> String {
        match Provider::detect(&self.host) {
            Some(p) => format!("{p} page"),
            None => format!("page '{}'", self.host),
        }
    }

    /// Rows from an unrecognized host are not read at all.
    fn read_rows(&mut self) -> Result<Vec<RawRow>> {
        if Provider::detect(&self.host).is_none() {
            warn!(host = %self.host, "Provider not detected, ignoring page rows");
            return Ok(Vec::new());
        }
        Ok(self.rows.clone())
    }

    fn captured_at(&self) -> Option<DateTime<Utc>> {
        self.captured_at
    }
}

/// Rows from the headers of every message in an MBOX file.
pub struct MboxSource {
    reader: MboxReader,
}

impl MboxSource {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            reader: MboxReader::new(path)?,
        })
    }
}

impl RowSource for MboxSource {
    fn label(&self) -> String {
        self.reader.path().display().to_string()
    }

    fn read_rows(&mut self) -> Result<Vec<RawRow>> {
        let mut rows = Vec::new();
        let mut skipped = 0usize;
        self.reader.for_each_header(&mut |header_bytes| {
            match parse_headers_to_row(header_bytes) {
                Some(row) => rows.push(row),
                None => skipped += 1,
            }
            true
        })?;
        if skipped > 0 {
            warn!(path = %self.reader.path().display(), skipped, "Skipped unparseable messages");
        }
        Ok(rows)
    }
}

/// Rows from a set of `.eml` files, or every `.eml` file in a directory.
pub struct EmlSource {
    paths: Vec<PathBuf>,
}

impl EmlSource {
    /// Use exactly these files, in the given order.
    pub fn from_files(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }

    /// Every `*.eml` file directly inside `dir`, sorted by file name.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let entries =
            std::fs::read_dir(dir).map_err(|e| crate::error::SweepError::open(dir, e))?;
        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| {
                p.extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("eml"))
            })
            .collect();
        paths.sort();
        Ok(Self { paths })
    }
}

impl RowSource for EmlSource {
    fn label(&self) -> String {
        format!("{} eml files", self.paths.len())
    }

    fn read_rows(&mut self) -> Result<Vec<RawRow>> {
        let mut rows = Vec::with_capacity(self.paths.len());
        for path in &self.paths {
            match parse_eml(path) {
                Ok(Some(row)) => rows.push(row),
                Ok(None) => warn!(path = %path.display(), "No headers found, skipping"),
                Err(e) => warn!(path = %path.display(), error = %e, "Could not read eml, skipping"),
            }
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn row(sender: &str, subject: &str) -> RawRow {
        RawRow {
            sender: sender.into(),
            subject: subject.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_extract_skips_blank_rows_and_renumbers() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let mut rows = vec![row("a@b.com", "One"), RawRow::default(), row("", "Three")];
        let records = extract(&mut rows, now).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].index, 0);
        assert_eq!(records[1].index, 1);
        assert_eq!(records[1].sender, "Unknown");
        assert_eq!(records[1].subject, "three");
    }

    #[test]
    fn test_page_rows_need_known_provider() {
        let mut page = PageSnapshot {
            host: "calendar.example.com".into(),
            captured_at: None,
            rows: vec![row("a@b.com", "weekly digest")],
        };
        assert!(page.read_rows().unwrap().is_empty());

        page.host = "https://outlook.live.com/mail/0/".into();
        assert_eq!(page.read_rows().unwrap().len(), 1);
    }

    #[test]
    fn test_eml_dir_ignores_other_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("b.eml"),
            "From: b@example.com\nSubject: B\n\nbody\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("a.EML"),
            "From: a@example.com\nSubject: A\n\nbody\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignore me").unwrap();

        let mut source = EmlSource::from_dir(dir.path()).unwrap();
        let rows = source.read_rows().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].subject, "A");
        assert_eq!(rows[1].subject, "B");
    }
}
