//! File age from last change.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strata_scm::LogEntry;

/// Age of the most recent change for one path (or group key).
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use strata_metrics::FileAge;
///
/// let age = FileAge {
///     path: "src/main.rs".into(),
///     last_change: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
///     age_days: 12.5,
/// };
/// assert!(age.age_days > 0.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileAge {
    /// Path, or the group key when aggregating by component.
    pub path: String,
    /// Date of the most recent change.
    pub last_change: DateTime<Utc>,
    /// Elapsed time since `last_change`, in fractional days.
    pub age_days: f64,
}

/// Age of each file based on its last change in the log.
///
/// `now` is passed explicitly so results are reproducible: callers pass
/// `Utc::now()` outside tests. Rows are sorted by path.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use strata_metrics::ages;
///
/// let report = ages(&[], Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
/// assert!(report.is_empty());
/// ```
pub fn ages(log: &[LogEntry], now: DateTime<Utc>) -> Vec<FileAge> {
    ages_by(log, |entry| Some(entry.path.clone()), now)
}

/// Age of each group of log entries, keyed by `key`.
///
/// Entries mapped to `None` are left out, so a key function can also
/// filter. Useful for component-level ages:
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use strata_metrics::{ages_by, component_of};
/// # let log = vec![];
///
/// let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
/// let by_component = ages_by(&log, |e| Some(component_of(&e.path, 1)), now);
/// assert!(by_component.is_empty());
/// ```
pub fn ages_by<F>(log: &[LogEntry], key: F, now: DateTime<Utc>) -> Vec<FileAge>
where
    F: Fn(&LogEntry) -> Option<String>,
{
    let mut last_change: HashMap<String, DateTime<Utc>> = HashMap::new();
    for entry in log {
        let Some(group) = key(entry) else {
            continue;
        };
        let slot = last_change.entry(group).or_insert(entry.date);
        if entry.date > *slot {
            *slot = entry.date;
        }
    }

    let mut report: Vec<FileAge> = last_change
        .into_iter()
        .map(|(path, last)| FileAge {
            path,
            last_change: last,
            age_days: ((now - last).num_seconds() as f64 / 86_400.0).max(0.0),
        })
        .collect();
    report.sort_by(|a, b| a.path.cmp(&b.path));
    report
}
