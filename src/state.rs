//! Persisted state: last scan snapshot, counters, settings, sender lists.
//!
//! Stored as one JSON document. A missing file means "fresh install" and
//! yields defaults; a corrupt file is an error so it is never silently
//! overwritten.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::aggregate::{ScanStats, SenderAggregate};
use crate::error::{Result, SweepError};

/// User-facing cleanup settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub auto_clean: bool,
    /// Ask before destructive actions.
    pub safe_mode: bool,
    pub auto_clean_days: u32,
    /// Scan automatically when a webmail page finishes loading.
    pub auto_scan: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            auto_clean: false,
            safe_mode: true,
            auto_clean_days: 7,
            auto_scan: false,
        }
    }
}

/// Everything kept between scans.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepState {
    pub settings: Settings,
    /// Counts from the most recent scan.
    pub stats: ScanStats,
    /// Messages deleted across all runs.
    pub deleted: usize,
    pub top_senders: Vec<SenderAggregate>,
    pub last_scan: Option<DateTime<Utc>>,
    pub blocked_senders: Vec<String>,
    pub whitelisted_senders: Vec<String>,
}

impl SweepState {
    /// Replace the last-scan snapshot.
    pub fn record_scan(
        &mut self,
        stats: ScanStats,
        top_senders: Vec<SenderAggregate>,
        at: DateTime<Utc>,
    ) {
        self.stats = stats;
        self.top_senders = top_senders;
        self.last_scan = Some(at);
    }

    pub fn add_deleted(&mut self, count: usize) {
        self.deleted += count;
    }

    /// Block a sender. Returns `false` if it was already blocked.
    pub fn block_sender(&mut self, sender: &str) -> bool {
        add_unique(&mut self.blocked_senders, sender)
    }

    /// Unblock a sender. Returns `false` if it was not blocked.
    pub fn unblock_sender(&mut self, sender: &str) -> bool {
        let key = sender.trim().to_lowercase();
        let before = self.blocked_senders.len();
        self.blocked_senders.retain(|s| *s != key);
        self.blocked_senders.len() != before
    }

    /// Whitelist a sender. Returns `false` if it was already whitelisted.
    pub fn whitelist_sender(&mut self, sender: &str) -> bool {
        add_unique(&mut self.whitelisted_senders, sender)
    }

    pub fn is_blocked(&self, sender_email: &str) -> bool {
        let key = sender_email.to_lowercase();
        self.blocked_senders.contains(&key)
    }

    pub fn is_whitelisted(&self, sender_email: &str) -> bool {
        let key = sender_email.to_lowercase();
        self.whitelisted_senders.contains(&key)
    }
}

fn add_unique(list: &mut Vec<String>, sender: &str) -> bool {
    let key = sender.trim().to_lowercase();
    if key.is_empty() || list.contains(&key) {
        return false;
    }
    list.push(key);
    true
}

/// JSON file holding a [`SweepState`].
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the state, or defaults if the file does not exist yet.
    pub fn load(&self) -> Result<SweepState> {
        let data = match std::fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No state file, starting fresh");
                return Ok(SweepState::default());
            }
            Err(e) => return Err(SweepError::io(&self.path, e)),
        };
        serde_json::from_str(&data).map_err(|e| SweepError::InvalidState {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }

    /// Write the state, creating parent directories as needed.
    ///
    /// Writes to a sibling temp file and renames it into place.
    pub fn save(&self, state: &SweepState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| SweepError::io(parent, e))?;
        }
        let json = serde_json::to_string_pretty(state).map_err(|e| SweepError::InvalidState {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(|e| SweepError::io(&tmp, e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| SweepError::io(&self.path, e))?;
        info!(path = %self.path.display(), "Saved state");
        Ok(())
    }

    /// Load, apply `f`, save. Returns whatever `f` returns.
    pub fn update<T>(&self, f: impl FnOnce(&mut SweepState) -> T) -> Result<T> {
        let mut state = self.load()?;
        let out = f(&mut state);
        self.save(&state)?;
        Ok(out)
    }
}
