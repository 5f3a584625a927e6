//! JSON snapshots of the rows visible on a webmail page.
//!
//! A snapshot is what a content script would capture from the inbox list:
//!
//! ```json
//! {
//!   "host": "mail.google.com",
//!   "captured_at": "2024-06-01T12:00:00Z",
//!   "rows": [
//!     { "sender": "Shop <promo@shop.com>", "subject": "50% off", "date": "Jun 1, 2024, 9:00 AM" }
//!   ]
//! }
//! ```

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SweepError};
use crate::model::record::RawRow;

/// Rows captured from one webmail page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageSnapshot {
    /// Hostname of the page the rows came from.
    #[serde(default)]
    pub host: String,
    /// When the rows were captured; used as "now" for undated rows.
    #[serde(default)]
    pub captured_at: Option<DateTime<Utc>>,
    /// Rows in on-screen order.
    #[serde(default)]
    pub rows: Vec<RawRow>,
}

impl PageSnapshot {
    /// Load a snapshot from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| SweepError::open(path, e))?;
        serde_json::from_str(&decode_text(&bytes)).map_err(|e| SweepError::InvalidSnapshot {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Write the snapshot as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self).map_err(|e| SweepError::InvalidSnapshot {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        std::fs::write(path, json).map_err(|e| SweepError::io(path, e))
    }
}

/// Decode snapshot bytes.
///
/// Honors a UTF-8/UTF-16 BOM, then tries UTF-8, then falls back to
/// Windows-1252 (which accepts every byte).
fn decode_text(bytes: &[u8]) -> String {
    if let Some((encoding, bom_len)) = encoding_rs::Encoding::for_bom(bytes) {
        let (decoded, _) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        return decoded.into_owned();
    }
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => {
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            decoded.into_owned()
        }
    }
}
