//! Co-change coupling.
//!
//! Counts how often pairs of paths change under the same join key
//! (revision, day, or ticket) versus independently, and derives a
//! directed coupling ratio.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use strata_scm::LogEntry;

static TICKET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Z][A-Z0-9]+-\d+\b").unwrap());

/// The key under which two entries count as "changed together".
///
/// # Examples
///
/// ```
/// use strata_metrics::CochangeKey;
///
/// assert_eq!(CochangeKey::default(), CochangeKey::Revision);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CochangeKey {
    /// Same revision (default).
    #[default]
    Revision,
    /// Same calendar day.
    Day,
    /// Same ticket id (`ABC-123` tokens in the commit message); entries
    /// whose message carries no ticket are left out.
    Ticket,
}

/// A directed co-change pair.
///
/// `coupling` is `cochanges / changes`, where `changes` counts the
/// primary path alone — so it always lies in [0, 1] and reads as "when
/// `primary` changes, how often does `dependency` change too".
///
/// # Examples
///
/// ```
/// use strata_metrics::CoChange;
///
/// let pair = CoChange {
///     primary: "requirements.txt".into(),
///     dependency: "stats.py".into(),
///     changes: 1,
///     cochanges: 1,
///     coupling: 1.0,
/// };
/// assert!(pair.coupling >= 0.0 && pair.coupling <= 1.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoChange {
    /// The path whose changes are the denominator.
    pub primary: String,
    /// The path that changed along with it.
    pub dependency: String,
    /// Distinct keys under which `primary` changed.
    pub changes: u64,
    /// Distinct keys under which both changed.
    pub cochanges: u64,
    /// `cochanges / changes`.
    pub coupling: f64,
}

/// Compute the co-change report for the log.
///
/// Duplicate (key, path) pairs are collapsed first, so a revision that
/// lists a path twice (e.g. a rename plus an edit) counts once. Rows are
/// sorted by coupling descending, then primary and dependency ascending —
/// identical input always produces the identical report.
///
/// # Examples
///
/// ```
/// use strata_metrics::{co_changes, CochangeKey};
///
/// let report = co_changes(&[], CochangeKey::Revision);
/// assert!(report.is_empty());
/// ```
pub fn co_changes(log: &[LogEntry], on: CochangeKey) -> Vec<CoChange> {
    // BTreeMap keeps key iteration deterministic
    let mut paths_by_key: BTreeMap<String, BTreeSet<&str>> = BTreeMap::new();
    for entry in log {
        let Some(key) = change_key(entry, on) else {
            continue;
        };
        paths_by_key.entry(key).or_default().insert(entry.path.as_str());
    }

    let mut changes: HashMap<&str, u64> = HashMap::new();
    let mut cochanges: HashMap<(&str, &str), u64> = HashMap::new();
    for paths in paths_by_key.values() {
        for &path in paths {
            *changes.entry(path).or_default() += 1;
        }
        for &primary in paths {
            for &dependency in paths {
                if primary != dependency {
                    *cochanges.entry((primary, dependency)).or_default() += 1;
                }
            }
        }
    }

    let mut report: Vec<CoChange> = cochanges
        .into_iter()
        .map(|((primary, dependency), co_count)| {
            let change_count = changes.get(primary).copied().unwrap_or(0).max(co_count);
            CoChange {
                primary: primary.to_string(),
                dependency: dependency.to_string(),
                changes: change_count,
                cochanges: co_count,
                coupling: co_count as f64 / change_count as f64,
            }
        })
        .collect();

    report.sort_by(|a, b| {
        b.coupling
            .partial_cmp(&a.coupling)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.primary.cmp(&b.primary))
            .then_with(|| a.dependency.cmp(&b.dependency))
    });
    report
}

fn change_key(entry: &LogEntry, on: CochangeKey) -> Option<String> {
    match on {
        CochangeKey::Revision => Some(entry.revision.clone()),
        CochangeKey::Day => Some(entry.date.format("%Y-%m-%d").to_string()),
        CochangeKey::Ticket => TICKET_RE
            .find(&entry.message)
            .map(|m| m.as_str().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn entry(revision: &str, path: &str, date: DateTime<Utc>, message: &str) -> LogEntry {
        LogEntry {
            revision: revision.into(),
            author: "alice".into(),
            date,
            path: path.into(),
            message: message.into(),
            copy_from_path: None,
            added: Some(1),
            removed: Some(0),
        }
    }

    fn fixture() -> Vec<LogEntry> {
        vec![
            entry(
                "1016",
                "stats.py",
                Utc.with_ymd_and_hms(2018, 2, 26, 10, 28, 0).unwrap(),
                "modified again",
            ),
            entry(
                "1018",
                "stats.py",
                Utc.with_ymd_and_hms(2018, 2, 24, 11, 14, 11).unwrap(),
                "modified",
            ),
            entry(
                "1018",
                "requirements.txt",
                Utc.with_ymd_and_hms(2018, 2, 24, 11, 14, 11).unwrap(),
                "modified",
            ),
        ]
    }

    #[test]
    fn coupling_by_revision() {
        let report = co_changes(&fixture(), CochangeKey::Revision);
        assert_eq!(report.len(), 2);

        // requirements.txt always changes with stats.py
        let first = &report[0];
        assert_eq!(first.primary, "requirements.txt");
        assert_eq!(first.dependency, "stats.py");
        assert_eq!(first.changes, 1);
        assert_eq!(first.cochanges, 1);
        assert_eq!(first.coupling, 1.0);

        // stats.py changes alone half the time
        let second = &report[1];
        assert_eq!(second.primary, "stats.py");
        assert_eq!(second.dependency, "requirements.txt");
        assert_eq!(second.changes, 2);
        assert_eq!(second.cochanges, 1);
        assert_eq!(second.coupling, 0.5);
    }

    #[test]
    fn coupling_by_day_merges_same_day_revisions() {
        // collapse everything onto one day: both directions couple fully
        let log: Vec<LogEntry> = fixture()
            .into_iter()
            .map(|mut e| {
                e.date = Utc.with_ymd_and_hms(2018, 2, 24, 12, 0, 0).unwrap();
                e
            })
            .collect();
        let report = co_changes(&log, CochangeKey::Day);
        assert_eq!(report.len(), 2);
        for pair in &report {
            assert_eq!(pair.coupling, 1.0);
            assert_eq!(pair.changes, 1);
        }
    }

    #[test]
    fn coupling_by_ticket_joins_across_revisions() {
        let date = Utc.with_ymd_and_hms(2018, 3, 1, 0, 0, 0).unwrap();
        let log = vec![
            entry("2000", "auth.rs", date, "PROJ-42 add login"),
            entry("2001", "session.rs", date, "PROJ-42 follow-up"),
            entry("2002", "readme.md", date, "typo fix without ticket"),
        ];
        let report = co_changes(&log, CochangeKey::Ticket);
        assert_eq!(report.len(), 2);
        assert!(report.iter().all(|p| p.coupling == 1.0));
        assert!(report.iter().all(|p| p.primary != "readme.md"));
    }

    #[test]
    fn coupling_stays_in_unit_interval() {
        let report = co_changes(&fixture(), CochangeKey::Revision);
        for pair in &report {
            assert!(pair.coupling >= 0.0 && pair.coupling <= 1.0);
            assert!(pair.cochanges <= pair.changes);
        }
    }

    #[test]
    fn unrelated_paths_do_not_pair() {
        let log = vec![
            entry(
                "1",
                "a.rs",
                Utc.with_ymd_and_hms(2018, 1, 1, 0, 0, 0).unwrap(),
                "a",
            ),
            entry(
                "2",
                "b.rs",
                Utc.with_ymd_and_hms(2018, 1, 2, 0, 0, 0).unwrap(),
                "b",
            ),
        ];
        assert!(co_changes(&log, CochangeKey::Revision).is_empty());
    }

    #[test]
    fn duplicate_path_in_one_revision_counts_once() {
        let date = Utc.with_ymd_and_hms(2018, 1, 1, 0, 0, 0).unwrap();
        let log = vec![
            entry("1", "a.rs", date, "m"),
            entry("1", "a.rs", date, "m"),
            entry("1", "b.rs", date, "m"),
        ];
        let report = co_changes(&log, CochangeKey::Revision);
        let a = report.iter().find(|p| p.primary == "a.rs").unwrap();
        assert_eq!(a.changes, 1);
        assert_eq!(a.cochanges, 1);
    }

    #[test]
    fn report_is_reproducible() {
        let log = fixture();
        assert_eq!(
            co_changes(&log, CochangeKey::Revision),
            co_changes(&log, CochangeKey::Revision)
        );
    }
}
