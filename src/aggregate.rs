//! Per-category tallies and the top-sender ranking.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::classify::{Categorized, Category};
use crate::model::address::display_name;
use crate::model::record::MessageRecord;

/// Default number of senders kept in a ranking.
pub const DEFAULT_TOP_SENDERS: usize = 10;

/// Counts from one scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanStats {
    pub total: usize,
    pub newsletters: usize,
    pub promotions: usize,
    pub social: usize,
    pub notifications: usize,
    pub old: usize,
    /// `promotions + newsletters`.
    pub spam: usize,
}

impl ScanStats {
    pub fn from_categorized(total: usize, categorized: &Categorized<'_>) -> Self {
        let newsletters = categorized.newsletters.len();
        let promotions = categorized.promotions.len();
        Self {
            total,
            newsletters,
            promotions,
            social: categorized.social.len(),
            notifications: categorized.notifications.len(),
            old: categorized.old.len(),
            spam: promotions + newsletters,
        }
    }

    pub fn count(&self, category: Category) -> usize {
        match category {
            Category::Newsletters => self.newsletters,
            Category::Promotions => self.promotions,
            Category::Social => self.social,
            Category::Notifications => self.notifications,
        }
    }
}

/// How many messages one sender contributed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenderAggregate {
    pub email: String,
    /// Display name from the first message seen, or the email.
    pub name: String,
    pub count: usize,
}

/// Rank senders by message count, most frequent first.
///
/// Senders with equal counts keep the order in which they were first seen.
/// At most `limit` entries are returned.
pub fn top_senders<'a, I>(records: I, limit: usize) -> Vec<SenderAggregate>
where
    I: IntoIterator<Item = &'a MessageRecord>,
{
    let mut ranking: Vec<SenderAggregate> = Vec::new();
    let mut position: HashMap<&'a str, usize> = HashMap::new();

    for record in records {
        match position.get(record.sender_email.as_str()) {
            Some(&i) => ranking[i].count += 1,
            None => {
                position.insert(record.sender_email.as_str(), ranking.len());
                ranking.push(SenderAggregate {
                    email: record.sender_email.clone(),
                    name: display_name(&record.sender, &record.sender_email),
                    count: 1,
                });
            }
        }
    }

    // `sort_by` is stable, so discovery order survives among ties.
    ranking.sort_by(|a, b| b.count.cmp(&a.count));
    ranking.truncate(limit);
    ranking
}
