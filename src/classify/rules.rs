//! Category buckets and their keyword / sender-pattern rules.

use std::borrow::Cow;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SweepError;

/// A heuristic classification bucket.
///
/// "Old" is not a category: it is computed independently from the date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Newsletters,
    Promotions,
    Social,
    Notifications,
}

impl Category {
    /// All categories, in evaluation order.
    pub const ALL: [Category; 4] = [
        Category::Newsletters,
        Category::Promotions,
        Category::Social,
        Category::Notifications,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Newsletters => "newsletters",
            Category::Promotions => "promotions",
            Category::Social => "social",
            Category::Notifications => "notifications",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = SweepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| SweepError::UnknownCategory(s.to_string()))
    }
}

/// Keyword and sender-pattern lists for one category.
///
/// The constructors store both lists lowercased. Matching folds case on both
/// sides anyway, so entries pushed straight into the fields still match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryRule {
    /// Substrings looked for in the subject.
    pub keywords: Vec<String>,
    /// Substrings looked for in the sender email.
    pub sender_patterns: Vec<String>,
}

impl CategoryRule {
    pub fn new<K, P>(keywords: K, sender_patterns: P) -> Self
    where
        K: IntoIterator,
        K::Item: AsRef<str>,
        P: IntoIterator,
        P::Item: AsRef<str>,
    {
        Self {
            keywords: lowercase_all(keywords),
            sender_patterns: lowercase_all(sender_patterns),
        }
    }

    /// Add a subject keyword. Existing matches are unaffected.
    pub fn add_keyword(&mut self, keyword: &str) {
        self.keywords.push(keyword.to_lowercase());
    }

    /// Add a sender pattern. Existing matches are unaffected.
    pub fn add_sender_pattern(&mut self, pattern: &str) {
        self.sender_patterns.push(pattern.to_lowercase());
    }

    /// True if `subject` contains any keyword or `sender_email` contains any pattern.
    pub fn matches(&self, subject: &str, sender_email: &str) -> bool {
        self.matches_subject(subject) || self.matches_sender(sender_email)
    }

    pub fn matches_subject(&self, subject: &str) -> bool {
        contains_any(subject, &self.keywords)
    }

    pub fn matches_sender(&self, sender_email: &str) -> bool {
        contains_any(sender_email, &self.sender_patterns)
    }

    /// Lowercase every entry in place (after deserializing user config).
    pub(crate) fn normalize(&mut self) {
        for k in self.keywords.iter_mut().chain(self.sender_patterns.iter_mut()) {
            *k = k.to_lowercase();
        }
    }
}

/// Case-insensitive containment of any non-empty needle.
fn contains_any(haystack: &str, needles: &[String]) -> bool {
    let haystack = folded(haystack);
    needles
        .iter()
        .any(|n| !n.is_empty() && haystack.contains(folded(n).as_ref()))
}

/// Lowercase only when there is something to lowercase.
fn folded(s: &str) -> Cow<'_, str> {
    if s.chars().any(char::is_uppercase) {
        Cow::Owned(s.to_lowercase())
    } else {
        Cow::Borrowed(s)
    }
}

fn lowercase_all<I>(items: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    items
        .into_iter()
        .map(|s| s.as_ref().to_lowercase())
        .collect()
}

/// One rule per category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleSet {
    pub newsletters: CategoryRule,
    pub promotions: CategoryRule,
    pub social: CategoryRule,
    pub notifications: CategoryRule,
}

impl RuleSet {
    pub fn get(&self, category: Category) -> &CategoryRule {
        match category {
            Category::Newsletters => &self.newsletters,
            Category::Promotions => &self.promotions,
            Category::Social => &self.social,
            Category::Notifications => &self.notifications,
        }
    }

    pub fn get_mut(&mut self, category: Category) -> &mut CategoryRule {
        match category {
            Category::Newsletters => &mut self.newsletters,
            Category::Promotions => &mut self.promotions,
            Category::Social => &mut self.social,
            Category::Notifications => &mut self.notifications,
        }
    }

    /// Iterate `(category, rule)` in evaluation order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, &CategoryRule)> {
        Category::ALL.into_iter().map(move |c| (c, self.get(c)))
    }

    pub(crate) fn normalize(&mut self) {
        for c in Category::ALL {
            self.get_mut(c).normalize();
        }
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            newsletters: CategoryRule::new(
                [
                    "newsletter",
                    "digest",
                    "weekly",
                    "daily",
                    "update",
                    "bulletin",
                    "roundup",
                ],
                ["news@", "newsletter@", "digest@", "updates@", "noreply@"],
            ),
            promotions: CategoryRule::new(
                [
                    "sale", "discount", "offer", "deal", "promo", "off", "save", "free", "limited",
                ],
                ["promo@", "marketing@", "offers@", "deals@", "sales@"],
            ),
            social: CategoryRule::new(
                [
                    "friend", "follow", "like", "comment", "mention", "share", "tagged",
                ],
                [
                    "@facebook",
                    "@twitter",
                    "@linkedin",
                    "@instagram",
                    "@tiktok",
                    "@youtube",
                ],
            ),
            notifications: CategoryRule::new(
                [
                    "notification",
                    "alert",
                    "update",
                    "confirm",
                    "verify",
                    "security",
                ],
                ["notification@", "alerts@", "noreply@", "no-reply@"],
            ),
        }
    }
}
