//! Churn × size hot-spot scoring.
//!
//! Crosses the SCM log with line counts, using code size as a cheap
//! complexity proxy, to surface paths that are both large and frequently
//! changed — the Tornhill hot-spot methodology.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use strata_loc::LocRecord;
use strata_scm::LogEntry;

/// How changes are counted per path.
///
/// # Examples
///
/// ```
/// use strata_metrics::ChangeGranularity;
///
/// assert_eq!(ChangeGranularity::default(), ChangeGranularity::Revision);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeGranularity {
    /// One change per revision touching the path (default).
    #[default]
    Revision,
    /// One change per calendar day touching the path, so a flurry of
    /// same-day commits counts once.
    Day,
}

/// What happens to paths present on only one side of the join.
///
/// # Examples
///
/// ```
/// use strata_metrics::JoinPolicy;
///
/// assert_eq!(JoinPolicy::default(), JoinPolicy::Outer);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinPolicy {
    /// Keep them, zero-filling the missing side (default).
    #[default]
    Outer,
    /// Drop them.
    Inner,
}

/// Options for hot-spot scoring.
#[derive(Debug, Clone, Copy, Default)]
pub struct HotSpotOptions {
    /// Change counting granularity.
    pub granularity: ChangeGranularity,
    /// Join policy between loc records and the log.
    pub join: JoinPolicy,
}

/// One scored row of the hot-spot report.
///
/// # Examples
///
/// ```
/// use strata_metrics::HotSpot;
///
/// let spot = HotSpot {
///     language: "Python".into(),
///     path: "stats.py".into(),
///     blank: 28,
///     comment: 84,
///     lines: 100,
///     changes: 2,
///     complexity_score: 1.0,
///     changes_score: 1.0,
///     score: 2.0,
/// };
/// assert_eq!(spot.score, spot.complexity_score + spot.changes_score);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotSpot {
    /// Language from the loc report, `"Unknown"` for log-only paths.
    pub language: String,
    /// File path.
    pub path: String,
    /// Blank lines.
    pub blank: u64,
    /// Comment lines.
    pub comment: u64,
    /// Code lines, the complexity proxy.
    pub lines: u64,
    /// Changes counted at the configured granularity.
    pub changes: u64,
    /// `lines` min-max normalized to [0, 1] over the report.
    pub complexity_score: f64,
    /// `changes` min-max normalized to [0, 1] over the report.
    pub changes_score: f64,
    /// `complexity_score + changes_score`.
    pub score: f64,
}

/// Cross the log and loc tables into a ranked hot-spot report.
///
/// Rows are sorted by score descending, then path ascending, so a given
/// input always yields the identical ranking. When every row has the
/// same value in a column, that column's normalized score is 0 for all
/// rows rather than dividing by zero.
///
/// # Examples
///
/// ```
/// use strata_metrics::{hot_spots, HotSpotOptions};
///
/// let report = hot_spots(&[], &[], &HotSpotOptions::default());
/// assert!(report.is_empty());
/// ```
pub fn hot_spots(log: &[LogEntry], loc: &[LocRecord], options: &HotSpotOptions) -> Vec<HotSpot> {
    let changes = count_changes(log, options.granularity);

    let mut spots: Vec<HotSpot> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();

    for record in loc {
        let change_count = changes.get(record.path.as_str()).copied().unwrap_or(0);
        if change_count == 0 && options.join == JoinPolicy::Inner {
            continue;
        }
        seen.insert(record.path.as_str());
        spots.push(HotSpot {
            language: record.language.clone(),
            path: record.path.clone(),
            blank: record.blank,
            comment: record.comment,
            lines: record.code,
            changes: change_count,
            complexity_score: 0.0,
            changes_score: 0.0,
            score: 0.0,
        });
    }

    if options.join == JoinPolicy::Outer {
        // changed paths missing from the loc report (deleted, binary, ...)
        for (path, change_count) in &changes {
            if seen.contains(path.as_str()) {
                continue;
            }
            spots.push(HotSpot {
                language: "Unknown".into(),
                path: path.clone(),
                blank: 0,
                comment: 0,
                lines: 0,
                changes: *change_count,
                complexity_score: 0.0,
                changes_score: 0.0,
                score: 0.0,
            });
        }
    }

    score(&mut spots);
    spots.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.path.cmp(&b.path))
    });
    spots
}

fn count_changes(log: &[LogEntry], granularity: ChangeGranularity) -> HashMap<String, u64> {
    let mut seen: HashSet<(String, &str)> = HashSet::new();
    let mut changes: HashMap<String, u64> = HashMap::new();
    for entry in log {
        let key = match granularity {
            ChangeGranularity::Revision => entry.revision.clone(),
            ChangeGranularity::Day => entry.date.format("%Y-%m-%d").to_string(),
        };
        if seen.insert((key, entry.path.as_str())) {
            *changes.entry(entry.path.clone()).or_default() += 1;
        }
    }
    changes
}

fn score(spots: &mut [HotSpot]) {
    let Some(first) = spots.first() else {
        return;
    };
    let mut min_lines = first.lines;
    let mut max_lines = first.lines;
    let mut min_changes = first.changes;
    let mut max_changes = first.changes;
    for spot in spots.iter() {
        min_lines = min_lines.min(spot.lines);
        max_lines = max_lines.max(spot.lines);
        min_changes = min_changes.min(spot.changes);
        max_changes = max_changes.max(spot.changes);
    }

    for spot in spots.iter_mut() {
        spot.complexity_score = normalize(spot.lines, min_lines, max_lines);
        spot.changes_score = normalize(spot.changes, min_changes, max_changes);
        spot.score = spot.complexity_score + spot.changes_score;
    }
}

fn normalize(value: u64, min: u64, max: u64) -> f64 {
    if max == min {
        return 0.0;
    }
    (value - min) as f64 / (max - min) as f64
}
