//! Input parsing: MBOX header streaming, EML files, page snapshots, and dates.

pub mod date;
pub mod eml;
pub mod header;
pub mod mbox;
pub mod snapshot;
