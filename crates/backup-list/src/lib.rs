//! # backup-list
//! Lists backups read from stdin with their display date and completeness.
//!

mod config;
mod context;
mod listing;

pub use config::{Config, LoadConfigError};
pub use context::Context;
pub use listing::{BackupEntry, BackupRow, EMPTY_MESSAGE, Listing, read_entries};
