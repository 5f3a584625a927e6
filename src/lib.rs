//! `inboxsweep`: heuristic inbox classification and cleanup planning.
//!
//! Rows from a webmail page snapshot, an MBOX file or `.eml` files are
//! normalized into message records, classified into newsletters,
//! promotions, social and notifications (plus an independent "old" flag),
//! tallied, and ranked by sender. Bulk delete/unsubscribe runs are planned
//! here and carried out by the host through [`action::ActionSink`].

pub mod action;
pub mod aggregate;
pub mod classify;
pub mod config;
pub mod error;
pub mod extract;
pub mod logging;
pub mod model;
pub mod parser;
pub mod scan;
pub mod state;

pub use classify::{Category, Classifier, Target};
pub use error::{Result, SweepError};
pub use scan::{ScanReport, Scanner};
