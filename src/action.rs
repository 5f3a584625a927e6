//! Bulk delete / unsubscribe over categorized records.
//!
//! The crate decides *which* messages to act on and paces the steps; the
//! host performs each step through an [`ActionSink`]. Steps run strictly one
//! after another with fixed pauses so the host page is never driven faster
//! than a person could click.

use std::collections::HashSet;
use std::thread;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::classify::{Categorized, Target};
use crate::config::ActionsConfig;
use crate::error::Result;
use crate::model::record::MessageRecord;

/// Host side of a bulk action.
///
/// Implementations usually forward to a webmail page or a mail store. An
/// error from any method aborts the run.
pub trait ActionSink {
    /// Mark a message as selected.
    fn select(&mut self, record: &MessageRecord) -> Result<()>;

    /// Delete the selected message.
    fn delete(&mut self, record: &MessageRecord) -> Result<()>;

    /// Follow the unsubscribe link of a message.
    fn unsubscribe(&mut self, record: &MessageRecord) -> Result<()>;
}

/// The ordered set of records a bulk action will touch.
#[derive(Debug, Clone, Default)]
pub struct ActionPlan<'a> {
    records: Vec<&'a MessageRecord>,
    /// Records left out because their sender is whitelisted.
    pub skipped_whitelisted: usize,
}

impl<'a> ActionPlan<'a> {
    /// Collect the records of `targets`, in request order.
    ///
    /// A record reached through several targets is planned once. Senders in
    /// `whitelist` (compared case-insensitively against the sender email) are
    /// never planned.
    pub fn select(
        categorized: &Categorized<'a>,
        targets: &[Target],
        whitelist: &[String],
    ) -> Self {
        let whitelist: HashSet<String> = whitelist.iter().map(|s| s.to_lowercase()).collect();
        let mut seen: HashSet<usize> = HashSet::new();
        let mut plan = Self::default();

        for target in targets {
            for record in categorized.target(*target) {
                if !seen.insert(record.index) {
                    continue;
                }
                if whitelist.contains(&record.sender_email) {
                    plan.skipped_whitelisted += 1;
                    continue;
                }
                plan.records.push(record);
            }
        }

        debug!(
            targets = ?targets,
            planned = plan.records.len(),
            skipped = plan.skipped_whitelisted,
            "Built action plan"
        );
        plan
    }

    pub fn records(&self) -> &[&'a MessageRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Planned records that expose an unsubscribe marker.
    pub fn unsubscribable(&self) -> impl Iterator<Item = &'a MessageRecord> + '_ {
        self.records.iter().copied().filter(|r| r.has_unsubscribe)
    }
}

/// Outcome of a bulk run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ActionOutcome {
    /// Steps completed.
    pub count: usize,
    /// Records not acted on (whitelisted, or no unsubscribe marker).
    pub skipped: usize,
}

/// Executes an [`ActionPlan`] serially with fixed pauses.
#[derive(Debug, Clone)]
pub struct BulkRunner {
    select_delay: Duration,
    step_delay: Duration,
}

impl Default for BulkRunner {
    fn default() -> Self {
        Self::from_config(&ActionsConfig::default())
    }
}

impl BulkRunner {
    pub fn new(select_delay: Duration, step_delay: Duration) -> Self {
        Self {
            select_delay,
            step_delay,
        }
    }

    pub fn from_config(config: &ActionsConfig) -> Self {
        Self::new(
            Duration::from_millis(config.select_delay_ms),
            Duration::from_millis(config.step_delay_ms),
        )
    }

    /// Runner with no pauses.
    pub fn immediate() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    /// Select then delete every planned record.
    pub fn delete(&self, plan: &ActionPlan<'_>, sink: &mut dyn ActionSink) -> Result<ActionOutcome> {
        let mut outcome = ActionOutcome {
            count: 0,
            skipped: plan.skipped_whitelisted,
        };

        for record in plan.records() {
            sink.select(record)?;
            pause(self.select_delay);
            sink.delete(record).inspect_err(|e| {
                warn!(index = record.index, error = %e, "Delete failed, stopping");
            })?;
            outcome.count += 1;
            pause(self.step_delay);
        }

        info!(deleted = outcome.count, skipped = outcome.skipped, "Bulk delete finished");
        Ok(outcome)
    }

    /// Unsubscribe from every planned record that has an unsubscribe marker.
    pub fn unsubscribe(
        &self,
        plan: &ActionPlan<'_>,
        sink: &mut dyn ActionSink,
    ) -> Result<ActionOutcome> {
        let mut outcome = ActionOutcome {
            count: 0,
            skipped: plan.skipped_whitelisted,
        };

        for record in plan.records() {
            if !record.has_unsubscribe {
                outcome.skipped += 1;
                continue;
            }
            sink.unsubscribe(record)?;
            outcome.count += 1;
            pause(self.step_delay);
        }

        info!(
            unsubscribed = outcome.count,
            skipped = outcome.skipped,
            "Bulk unsubscribe finished"
        );
        Ok(outcome)
    }
}

fn pause(delay: Duration) {
    if !delay.is_zero() {
        thread::sleep(delay);
    }
}
