//! Records and seams shared by SCM backends.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strata_core::Result;

/// A single file change parsed from the SCM log.
///
/// One log entry per (revision, path) pair. `added` and `removed` are
/// `None` for binary files, where the client reports no line counts.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use strata_scm::LogEntry;
///
/// let entry = LogEntry {
///     revision: "2adcc03".into(),
///     author: "alice".into(),
///     date: Utc.with_ymd_and_hms(2024, 3, 5, 23, 44, 38).unwrap(),
///     path: "src/core.rs".into(),
///     message: "fix: windows paths".into(),
///     copy_from_path: None,
///     added: Some(1),
///     removed: Some(1),
/// };
/// assert_eq!(entry.added, Some(1));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// Short revision id.
    pub revision: String,
    /// Author name.
    pub author: String,
    /// Commit date, UTC.
    pub date: DateTime<Utc>,
    /// File path relative to the repository root.
    pub path: String,
    /// First line of the commit message.
    pub message: String,
    /// Previous path when the file was renamed in this revision.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copy_from_path: Option<String>,
    /// Lines added, absent for binary files.
    pub added: Option<u64>,
    /// Lines removed, absent for binary files.
    pub removed: Option<u64>,
}

/// File content retrieved from the SCM at a specific revision.
///
/// # Examples
///
/// ```
/// use strata_scm::FileDownload;
///
/// let dl = FileDownload {
///     revision: "HEAD".into(),
///     path: "src/lib.rs".into(),
///     content: "pub fn f() {}\n".into(),
/// };
/// assert!(dl.content.contains("fn f"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FileDownload {
    /// Revision the content was taken from.
    pub revision: String,
    /// Path within the repository.
    pub path: String,
    /// Full file content.
    pub content: String,
}

/// Lists the change history of a repository.
pub trait LogCollector {
    /// Retrieve the log as one entry per (revision, path) pair.
    ///
    /// # Errors
    ///
    /// Returns an error when the SCM client fails or its output cannot
    /// be parsed.
    fn get_log(&self) -> Result<Vec<LogEntry>>;
}

/// Retrieves file content at a given revision.
///
/// The seam between history analysis and the SCM client: complexity
/// analysis only needs this one capability, so tests can substitute an
/// in-memory implementation.
pub trait Downloader {
    /// Fetch `path` as it was at `revision`.
    ///
    /// # Errors
    ///
    /// Returns an error when the revision or path does not exist, or the
    /// SCM client fails.
    fn download(&self, revision: &str, path: &str) -> Result<FileDownload>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn log_entry_serializes_camel_case() {
        let entry = LogEntry {
            revision: "abc".into(),
            author: "alice".into(),
            date: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            path: "renamed.rs".into(),
            copy_from_path: Some("old.rs".into()),
            message: "m".into(),
            added: Some(3),
            removed: None,
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert!(json.get("copyFromPath").is_some());
        assert!(json.get("copy_from_path").is_none());
    }

    #[test]
    fn copy_from_path_omitted_when_absent() {
        let entry = LogEntry {
            revision: "abc".into(),
            author: "alice".into(),
            date: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            path: "a.rs".into(),
            copy_from_path: None,
            message: "m".into(),
            added: Some(1),
            removed: Some(0),
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert!(json.get("copyFromPath").is_none());
    }
}
