//! The scan pipeline: extract → classify → aggregate.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::action::ActionPlan;
use crate::aggregate::{top_senders, ScanStats, SenderAggregate, DEFAULT_TOP_SENDERS};
use crate::classify::{Categorized, Classifier, Target};
use crate::config::Config;
use crate::error::Result;
use crate::extract::{extract, Provider, RowSource};
use crate::model::record::MessageRecord;
use crate::parser::snapshot::PageSnapshot;
use crate::state::SweepState;

/// Everything one scan produced.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    /// Provider the rows came from, when scanned from a webmail page.
    pub provider: Option<Provider>,
    /// Clock used for age checks and undated rows.
    pub scanned_at: DateTime<Utc>,
    pub stats: ScanStats,
    pub top_senders: Vec<SenderAggregate>,
    pub records: Vec<MessageRecord>,
}

impl ScanReport {
    /// A report with nothing in it.
    pub fn empty(scanned_at: DateTime<Utc>) -> Self {
        Self {
            provider: None,
            scanned_at,
            stats: ScanStats::default(),
            top_senders: Vec::new(),
            records: Vec::new(),
        }
    }

    /// Store this scan as the state's last-scan snapshot.
    pub fn apply_to(&self, state: &mut SweepState) {
        state.record_scan(self.stats, self.top_senders.clone(), self.scanned_at);
    }
}

/// Runs scans with one classifier and ranking size.
#[derive(Debug, Clone)]
pub struct Scanner {
    classifier: Classifier,
    top_limit: usize,
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new(Classifier::default(), DEFAULT_TOP_SENDERS)
    }
}

impl Scanner {
    pub fn new(classifier: Classifier, top_limit: usize) -> Self {
        Self {
            classifier,
            top_limit,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.classifier(), config.classifier.top_senders)
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Classify and aggregate already-normalized records.
    pub fn scan_records(&self, records: Vec<MessageRecord>, now: DateTime<Utc>) -> ScanReport {
        let categorized = self.classifier.categorize_at(&records, now);
        let stats = ScanStats::from_categorized(records.len(), &categorized);
        let top_senders = top_senders(&records, self.top_limit);

        info!(
            total = stats.total,
            spam = stats.spam,
            old = stats.old,
            "Scan complete"
        );

        ScanReport {
            provider: None,
            scanned_at: now,
            stats,
            top_senders,
            records,
        }
    }

    /// Extract from `source`, then classify and aggregate.
    ///
    /// A source that knows its capture time supplies the scan clock.
    pub fn scan_source(&self, source: &mut dyn RowSource, now: DateTime<Utc>) -> Result<ScanReport> {
        let now = source.captured_at().unwrap_or(now);
        let records = extract(source, now)?;
        Ok(self.scan_records(records, now))
    }

    /// Scan the rows captured from a webmail page.
    ///
    /// The snapshot's capture time, when present, is the scan clock. A page
    /// from an unrecognized host yields an empty report.
    pub fn scan_page(&self, snapshot: &PageSnapshot, now: DateTime<Utc>) -> Result<ScanReport> {
        let Some(provider) = Provider::detect(&snapshot.host) else {
            warn!(host = %snapshot.host, "Provider not detected, nothing scanned");
            return Ok(ScanReport::empty(snapshot.captured_at.unwrap_or(now)));
        };

        let mut page = snapshot.clone();
        let mut report = self.scan_source(&mut page, now)?;
        report.provider = Some(provider);
        Ok(report)
    }

    /// Re-bucket a report's records with this scanner's classifier.
    pub fn categorize<'a>(&self, report: &'a ScanReport) -> Categorized<'a> {
        self.classifier
            .categorize_at(&report.records, report.scanned_at)
    }

    /// Plan a bulk action over `targets`, honoring the state's whitelist.
    pub fn plan<'a>(
        &self,
        categorized: &Categorized<'a>,
        targets: &[Target],
        state: &SweepState,
    ) -> ActionPlan<'a> {
        ActionPlan::select(categorized, targets, &state.whitelisted_senders)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::record::RawRow;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn row(sender: &str, subject: &str, date: &str) -> RawRow {
        RawRow {
            sender: sender.into(),
            subject: subject.into(),
            date: date.into(),
            has_unsubscribe: false,
        }
    }

    #[test]
    fn test_unknown_provider_is_empty() {
        let snap = PageSnapshot {
            host: "example.com".into(),
            captured_at: None,
            rows: vec![row("a@b.com", "weekly digest", "")],
        };
        let report = Scanner::default().scan_page(&snap, now()).unwrap();
        assert!(report.provider.is_none());
        assert_eq!(report.stats, ScanStats::default());
        assert!(report.records.is_empty());
    }

    #[test]
    fn test_unknown_provider_is_empty_through_any_entry_point() {
        let snap = PageSnapshot {
            host: "calendar.example.com".into(),
            captured_at: None,
            rows: vec![row("a@b.com", "weekly digest", "")],
        };
        let scanner = Scanner::default();
        let via_page = scanner.scan_page(&snap, now()).unwrap();
        let via_source = scanner.scan_source(&mut snap.clone(), now()).unwrap();
        assert_eq!(via_page.stats.total, 0);
        assert_eq!(via_source.stats.total, 0);
        assert!(via_source.records.is_empty());
    }

    #[test]
    fn test_scan_source_uses_capture_time() {
        let captured = Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap();
        let mut snap = PageSnapshot {
            host: "mail.yahoo.com".into(),
            captured_at: Some(captured),
            rows: vec![row("a@b.com", "hi", "Jan 1, 2024, 9:00 AM")],
        };
        let report = Scanner::default().scan_source(&mut snap, now()).unwrap();
        assert_eq!(report.scanned_at, captured);
        assert_eq!(report.stats.old, 0);
    }

    #[test]
    fn test_scan_page_uses_capture_time() {
        let captured = Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap();
        let snap = PageSnapshot {
            host: "mail.google.com".into(),
            captured_at: Some(captured),
            rows: vec![row("a@b.com", "hi", "Jan 1, 2024, 9:00 AM")],
        };
        let report = Scanner::default().scan_page(&snap, now()).unwrap();
        assert_eq!(report.provider, Some(Provider::Gmail));
        assert_eq!(report.scanned_at, captured);
        // Nine days before capture is not old, even though it is months before `now()`.
        assert_eq!(report.stats.old, 0);
    }

    #[test]
    fn test_stats_and_spam_total() {
        let mut rows = vec![
            row("Shop <promo@shop.com>", "50% off", ""),
            row("news@paper.com", "morning edition", ""),
            row("friend@example.com", "lunch?", "2024-01-01"),
        ];
        let report = Scanner::default().scan_source(&mut rows, now()).unwrap();
        assert_eq!(report.stats.total, 3);
        assert_eq!(report.stats.promotions, 1);
        assert_eq!(report.stats.newsletters, 1);
        assert_eq!(report.stats.spam, 2);
        assert_eq!(report.stats.old, 1);
        assert_eq!(report.top_senders.len(), 3);
        assert_eq!(report.top_senders[0].name, "Shop");
    }

    #[test]
    fn test_apply_to_state() {
        let mut rows = vec![row("a@b.com", "weekly digest", "")];
        let report = Scanner::default().scan_source(&mut rows, now()).unwrap();
        let mut state = SweepState::default();
        report.apply_to(&mut state);
        assert_eq!(state.stats.newsletters, 1);
        assert_eq!(state.last_scan, Some(now()));
        assert_eq!(state.top_senders[0].email, "a@b.com");
    }
}
