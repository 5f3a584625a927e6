//! Core data model types: raw rows, normalized records, and sender helpers.

pub mod address;
pub mod record;
