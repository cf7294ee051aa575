//! Component labels derived from paths.
//!
//! A component is the leading directory segments of a path, so reports
//! can aggregate at a coarser level than individual files without any
//! repository-specific configuration.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A path with its assigned component label.
///
/// # Examples
///
/// ```
/// use strata_metrics::PathComponent;
///
/// let pc = PathComponent {
///     path: "crates/core/src/lib.rs".into(),
///     component: "crates/core".into(),
/// };
/// assert!(pc.path.starts_with(&pc.component));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathComponent {
    /// File path.
    pub path: String,
    /// Component label.
    pub component: String,
}

/// The component label for one path: its first `depth` directory
/// segments joined by `/`. Paths at the repository root map to `"."`.
///
/// # Examples
///
/// ```
/// use strata_metrics::component_of;
///
/// assert_eq!(component_of("crates/core/src/lib.rs", 2), "crates/core");
/// assert_eq!(component_of("src/main.rs", 2), "src");
/// assert_eq!(component_of("README.md", 2), ".");
/// ```
pub fn component_of(path: &str, depth: usize) -> String {
    let segments: Vec<&str> = path.split('/').collect();
    let dirs = &segments[..segments.len().saturating_sub(1)];
    let take = dirs.len().min(depth.max(1));
    if take == 0 {
        return ".".into();
    }
    dirs[..take].join("/")
}

/// Assign a component to every path, sorted by component then path.
///
/// # Examples
///
/// ```
/// use strata_metrics::components;
///
/// let report = components(["src/a.rs", "src/b.rs"], 1);
/// assert_eq!(report.len(), 2);
/// assert!(report.iter().all(|pc| pc.component == "src"));
/// ```
pub fn components<I, S>(paths: I, depth: usize) -> Vec<PathComponent>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut report: Vec<PathComponent> = paths
        .into_iter()
        .map(|path| {
            let path = path.as_ref().to_string();
            let component = component_of(&path, depth);
            PathComponent { path, component }
        })
        .collect();
    report.sort_by(|a, b| {
        a.component
            .cmp(&b.component)
            .then_with(|| a.path.cmp(&b.path))
    });
    report
}

/// Path → component lookup for enriching other reports.
///
/// # Examples
///
/// ```
/// use strata_metrics::component_map;
///
/// let map = component_map(["src/a.rs"], 1);
/// assert_eq!(map["src/a.rs"], "src");
/// ```
pub fn component_map<I, S>(paths: I, depth: usize) -> HashMap<String, String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    paths
        .into_iter()
        .map(|path| {
            let path = path.as_ref().to_string();
            let component = component_of(&path, depth);
            (path, component)
        })
        .collect()
}
