//! Backup listing
//!

use std::io::{self, BufRead};

use backup_display::{BackupStatus, DateFormat};
use serde::Serialize;
use tracing::{debug, trace};

use crate::Context;

/// Shown in place of the listing when there are no backups.
pub const EMPTY_MESSAGE: &str = "No backups found.";

/// A backup as read from the input, `<file name>[\t<date>]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackupEntry {
    /// The backup's file name.
    pub file_name: String,
    /// The backup's date, if one was given.
    pub date: Option<String>,
}

impl BackupEntry {
    /// Parse an input line, lines without a file name have no entry.
    pub fn parse_line(line: &str) -> Option<Self> {
        let (file_name, date) = match line.split_once('\t') {
            Some((file_name, date)) => {
                let date = date.trim();
                (file_name, (!date.is_empty()).then(|| date.to_string()))
            }
            None => (line, None),
        };

        let file_name = file_name.trim();
        if file_name.is_empty() {
            return None;
        }

        Some(Self {
            file_name: file_name.to_string(),
            date,
        })
    }

    /// The string to format as this backup's date.
    ///
    /// Without a date the file stem is used, receiver backups are named by their UTC file stamp.
    pub fn date_input(&self) -> &str {
        match &self.date {
            Some(date) => date,
            None => file_stem(&self.file_name),
        }
    }
}

/// The file name up to its first `.`, without any leading directories.
fn file_stem(file_name: &str) -> &str {
    let name = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    name.split('.').next().unwrap_or(name)
}

/// Read backup entries from a reader, one per line.
pub fn read_entries<Read: BufRead>(
    context: &mut Context,
    reader: Read,
) -> io::Result<Vec<BackupEntry>> {
    context.current_context = "Read Entries";

    let mut entries = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        context.line = Some(index + 1);
        let line = line?;

        match BackupEntry::parse_line(&line) {
            Some(entry) => entries.push(entry),
            None => trace!("{context}Skipping line without a file name"),
        }
    }
    context.line = None;

    debug!("{context}Read {} entries", entries.len());

    Ok(entries)
}

/// A backup ready for display.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct BackupRow {
    /// The backup's file name.
    pub file_name: String,
    /// The backup's display date.
    pub date: String,
    /// Whether the backup is complete.
    pub status: BackupStatus,
}

impl BackupRow {
    /// Create the display row for an entry.
    pub fn new(entry: &BackupEntry, format: &DateFormat) -> Self {
        Self {
            file_name: entry.file_name.clone(),
            date: format.format(entry.date_input()),
            status: BackupStatus::classify(&entry.file_name),
        }
    }
}

/// The display rows for a list of backups.
#[derive(Debug, Default)]
pub struct Listing {
    /// The rows, in input order.
    pub rows: Vec<BackupRow>,
}

impl Listing {
    /// Create the listing for some entries.
    pub fn new(entries: &[BackupEntry], format: &DateFormat) -> Self {
        Self {
            rows: entries
                .iter()
                .map(|entry| BackupRow::new(entry, format))
                .collect(),
        }
    }

    /// The number of complete backups.
    pub fn complete_count(&self) -> usize {
        self.rows
            .iter()
            .filter(|row| row.status.is_complete())
            .count()
    }

    /// Render as aligned text with a summary line, or the empty message.
    pub fn render_text(&self) -> String {
        if self.rows.is_empty() {
            return EMPTY_MESSAGE.to_string();
        }

        let date_width = self
            .rows
            .iter()
            .map(|row| row.date.chars().count())
            .max()
            .unwrap_or(0);

        let mut output = String::new();
        for row in &self.rows {
            output.push_str(&format!(
                "{:<8}  {:<date_width$}  {}\n",
                row.status, row.date, row.file_name
            ));
        }

        let backups = match self.rows.len() {
            1 => "1 backup".to_string(),
            count => format!("{count} backups"),
        };
        output.push_str(&format!("{backups}, {} complete", self.complete_count()));

        output
    }

    /// Render the rows as a JSON array.
    pub fn render_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.rows)
    }
}
