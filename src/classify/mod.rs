//! Message classification.
//!
//! A record belongs to every category whose rule matches it; membership is
//! non-exclusive. Age is judged separately: a record is old when its date is
//! strictly before `now - max_age`.

pub mod rules;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::debug;

use crate::model::record::MessageRecord;

pub use rules::{Category, CategoryRule, RuleSet};

/// Default age after which a message counts as old.
pub const DEFAULT_MAX_AGE_DAYS: u32 = 30;

/// Result of classifying one record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Classification {
    /// Matched categories, in evaluation order.
    pub categories: Vec<Category>,
    /// Date strictly before the age cutoff.
    pub old: bool,
}

impl Classification {
    pub fn is(&self, category: Category) -> bool {
        self.categories.contains(&category)
    }

    /// True when no category matched (age is not considered).
    pub fn is_uncategorized(&self) -> bool {
        self.categories.is_empty()
    }
}

/// Applies a [`RuleSet`] and an age threshold to records.
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: RuleSet,
    max_age: Duration,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(RuleSet::default(), DEFAULT_MAX_AGE_DAYS)
    }
}

impl Classifier {
    pub fn new(mut rules: RuleSet, max_age_days: u32) -> Self {
        rules.normalize();
        Self {
            rules,
            max_age: Duration::days(i64::from(max_age_days)),
        }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// The instant before which records are old, as seen at `now`.
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.max_age
    }

    /// Classify against the current clock.
    pub fn classify(&self, record: &MessageRecord) -> Classification {
        self.classify_at(record, Utc::now())
    }

    /// Classify as of `now`.
    pub fn classify_at(&self, record: &MessageRecord, now: DateTime<Utc>) -> Classification {
        self.classify_with_cutoff(record, self.cutoff(now))
    }

    fn classify_with_cutoff(
        &self,
        record: &MessageRecord,
        cutoff: DateTime<Utc>,
    ) -> Classification {
        let categories = self
            .rules
            .iter()
            .filter(|(_, rule)| rule.matches(&record.subject, &record.sender_email))
            .map(|(category, _)| category)
            .collect();

        Classification {
            categories,
            old: record.date < cutoff,
        }
    }

    /// Bucket `records` by category as of `now`.
    pub fn categorize_at<'a>(
        &self,
        records: &'a [MessageRecord],
        now: DateTime<Utc>,
    ) -> Categorized<'a> {
        let cutoff = self.cutoff(now);
        let mut out = Categorized::default();

        for record in records {
            let class = self.classify_with_cutoff(record, cutoff);
            for category in &class.categories {
                out.bucket_mut(*category).push(record);
            }
            if class.old {
                out.old.push(record);
            }
            if class.is_uncategorized() {
                out.uncategorized.push(record);
            }
        }

        debug!(
            records = records.len(),
            newsletters = out.newsletters.len(),
            promotions = out.promotions.len(),
            social = out.social.len(),
            notifications = out.notifications.len(),
            old = out.old.len(),
            uncategorized = out.uncategorized.len(),
            "Categorized records"
        );
        out
    }

    /// Bucket `records` against the current clock.
    pub fn categorize<'a>(&self, records: &'a [MessageRecord]) -> Categorized<'a> {
        self.categorize_at(records, Utc::now())
    }
}

/// Records grouped by bucket. A record may appear in several buckets.
#[derive(Debug, Clone, Default)]
pub struct Categorized<'a> {
    pub newsletters: Vec<&'a MessageRecord>,
    pub promotions: Vec<&'a MessageRecord>,
    pub social: Vec<&'a MessageRecord>,
    pub notifications: Vec<&'a MessageRecord>,
    pub old: Vec<&'a MessageRecord>,
    /// Records that matched no category.
    pub uncategorized: Vec<&'a MessageRecord>,
}

impl<'a> Categorized<'a> {
    pub fn bucket(&self, category: Category) -> &[&'a MessageRecord] {
        match category {
            Category::Newsletters => &self.newsletters,
            Category::Promotions => &self.promotions,
            Category::Social => &self.social,
            Category::Notifications => &self.notifications,
        }
    }

    fn bucket_mut(&mut self, category: Category) -> &mut Vec<&'a MessageRecord> {
        match category {
            Category::Newsletters => &mut self.newsletters,
            Category::Promotions => &mut self.promotions,
            Category::Social => &mut self.social,
            Category::Notifications => &mut self.notifications,
        }
    }

    /// Records selected by an action target (a category or the old bucket).
    pub fn target(&self, target: Target) -> &[&'a MessageRecord] {
        match target {
            Target::Category(c) => self.bucket(c),
            Target::Old => &self.old,
        }
    }
}

/// What a bulk action can be aimed at: a category, or the old bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Category(Category),
    Old,
}

impl std::str::FromStr for Target {
    type Err = crate::error::SweepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("old") {
            Ok(Target::Old)
        } else {
            s.parse().map(Target::Category)
        }
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::Category(c) => write!(f, "{c}"),
            Target::Old => f.write_str("old"),
        }
    }
}
