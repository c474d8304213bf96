use core::fmt::Display;

use serde::Serialize;

/// The token a complete backup carries in its file name.
const COMPLETE_TOKEN: &str = "complete";

/// Returns if the file name marks a complete backup.
///
/// Matching is case insensitive, `COMPLETE.BAK` and `MyCompleteBackup.tar` are both complete.
pub fn is_complete_backup(file_name: &str) -> bool {
    file_name.to_lowercase().contains(COMPLETE_TOKEN)
}

/// Whether a backup is complete, going by its file name.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BackupStatus {
    /// The file name carries the complete token.
    Complete,

    /// Anything else.
    Partial,
}

impl BackupStatus {
    /// Classify a backup by its file name.
    pub fn classify(file_name: &str) -> Self {
        if is_complete_backup(file_name) {
            Self::Complete
        } else {
            Self::Partial
        }
    }

    /// Returns if this is [`BackupStatus::Complete`].
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete)
    }

    /// The lowercase name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Complete => "complete",
            Self::Partial => "partial",
        }
    }
}

impl Display for BackupStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.pad(self.as_str())
    }
}
