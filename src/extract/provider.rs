//! Webmail provider detection from a page hostname.

use serde::{Deserialize, Serialize};

/// A webmail application whose inbox rows can be scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Gmail,
    Outlook,
    Yahoo,
    ProtonMail,
}

impl Provider {
    /// All providers, in detection order.
    pub const ALL: [Provider; 4] = [
        Provider::Gmail,
        Provider::Outlook,
        Provider::Yahoo,
        Provider::ProtonMail,
    ];

    /// Identify the provider serving `host`.
    ///
    /// Accepts a bare hostname or a full URL. Returns `None` for anything
    /// that is not a known webmail host.
    pub fn detect(host: &str) -> Option<Self> {
        let host = hostname_of(host);
        Self::ALL.into_iter().find(|p| p.matches(&host))
    }

    fn matches(self, host: &str) -> bool {
        match self {
            Provider::Gmail => host == "mail.google.com",
            Provider::Outlook => host.contains("outlook"),
            Provider::Yahoo => host.contains("mail.yahoo"),
            Provider::ProtonMail => host == "mail.proton.me",
        }
    }

    /// Human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            Provider::Gmail => "Gmail",
            Provider::Outlook => "Outlook",
            Provider::Yahoo => "Yahoo",
            Provider::ProtonMail => "ProtonMail",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Lowercased hostname from a host or URL (`"https://Mail.Google.com/mail/u/0"` → `"mail.google.com"`).
fn hostname_of(input: &str) -> String {
    let trimmed = input.trim();
    let without_scheme = trimmed
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(trimmed);
    let authority = without_scheme
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default();
    let host = authority.rsplit('@').next().unwrap_or_default();
    host.split(':').next().unwrap_or_default().to_lowercase()
}
