//! Mass change-set detection.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strata_scm::LogEntry;

/// A revision that touched more paths than the threshold.
///
/// Usually a refactor, a reformat, or generated-file churn; these
/// revisions distort coupling analysis and are worth excluding.
///
/// # Examples
///
/// ```
/// use strata_metrics::MassChange;
///
/// let mc = MassChange {
///     revision: "1018".into(),
///     path_count: 250,
///     author: "alice".into(),
///     message: "reformat the world".into(),
/// };
/// assert!(mc.path_count > 100);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MassChange {
    /// Revision id.
    pub revision: String,
    /// Number of distinct paths touched.
    pub path_count: u64,
    /// Author of the revision.
    pub author: String,
    /// First line of the commit message.
    pub message: String,
}

/// Revisions with strictly more than `min_changes` distinct paths.
///
/// Sorted by path count descending, then revision ascending.
///
/// # Examples
///
/// ```
/// use strata_metrics::mass_changes;
///
/// assert!(mass_changes(&[], 10).is_empty());
/// ```
pub fn mass_changes(log: &[LogEntry], min_changes: u64) -> Vec<MassChange> {
    struct Revision<'a> {
        paths: std::collections::BTreeSet<&'a str>,
        author: &'a str,
        message: &'a str,
    }

    let mut revisions: BTreeMap<&str, Revision> = BTreeMap::new();
    for entry in log {
        let revision = revisions.entry(entry.revision.as_str()).or_insert(Revision {
            paths: Default::default(),
            author: entry.author.as_str(),
            message: entry.message.as_str(),
        });
        revision.paths.insert(entry.path.as_str());
    }

    let mut report: Vec<MassChange> = revisions
        .into_iter()
        .filter(|(_, r)| r.paths.len() as u64 > min_changes)
        .map(|(revision, r)| MassChange {
            revision: revision.to_string(),
            path_count: r.paths.len() as u64,
            author: r.author.to_string(),
            message: r.message.to_string(),
        })
        .collect();

    report.sort_by(|a, b| {
        b.path_count
            .cmp(&a.path_count)
            .then_with(|| a.revision.cmp(&b.revision))
    });
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn entry(revision: &str, path: &str) -> LogEntry {
        LogEntry {
            revision: revision.into(),
            author: "alice".into(),
            date: Utc.with_ymd_and_hms(2018, 2, 24, 11, 14, 11).unwrap(),
            path: path.into(),
            message: "modified".into(),
            copy_from_path: None,
            added: Some(1),
            removed: Some(0),
        }
    }

    #[test]
    fn finds_revisions_above_threshold() {
        let log = vec![
            entry("1016", "stats.py"),
            entry("1018", "stats.py"),
            entry("1018", "requirements.txt"),
        ];
        let report = mass_changes(&log, 1);
        assert_eq!(report.len(), 1);
        assert_eq!(report[0].revision, "1018");
        assert_eq!(report[0].path_count, 2);
        assert_eq!(report[0].author, "alice");
    }

    #[test]
    fn threshold_is_strict() {
        let log = vec![entry("1018", "a.py"), entry("1018", "b.py")];
        assert!(mass_changes(&log, 2).is_empty());
        assert_eq!(mass_changes(&log, 1).len(), 1);
    }

    #[test]
    fn duplicate_paths_count_once() {
        let log = vec![
            entry("1018", "a.py"),
            entry("1018", "a.py"),
            entry("1018", "b.py"),
        ];
        assert_eq!(mass_changes(&log, 0)[0].path_count, 2);
    }

    #[test]
    fn rows_serialize_camel_case() {
        let log = vec![entry("1018", "a.py"), entry("1018", "b.py")];
        let json = serde_json::to_value(&mass_changes(&log, 0)[0]).unwrap();
        assert!(json.get("pathCount").is_some());
        assert!(json.get("path_count").is_none());
    }

    #[test]
    fn sorted_by_path_count_descending() {
        let log = vec![
            entry("10", "a.py"),
            entry("20", "a.py"),
            entry("20", "b.py"),
            entry("20", "c.py"),
            entry("30", "a.py"),
            entry("30", "b.py"),
        ];
        let report = mass_changes(&log, 0);
        assert_eq!(report[0].revision, "20");
        assert_eq!(report[1].revision, "30");
        assert_eq!(report[2].revision, "10");
    }
}
