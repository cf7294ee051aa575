//! cloc invocation and report parsing.

use std::path::Path;

use serde::{Deserialize, Serialize};
use strata_core::{split_csv_record, Result, StrataError};
use strata_scm::run_tool;

use crate::cache::LocCache;

/// Per-file line counts parsed from a cloc report.
///
/// # Examples
///
/// ```
/// use strata_loc::LocRecord;
///
/// let record = LocRecord {
///     language: "Rust".into(),
///     path: "src/main.rs".into(),
///     blank: 10,
///     comment: 25,
///     code: 130,
/// };
/// assert_eq!(record.code, 130);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocRecord {
    /// Language detected by cloc.
    pub language: String,
    /// File path as reported, normalized to forward slashes.
    pub path: String,
    /// Blank lines.
    pub blank: u64,
    /// Comment lines.
    pub comment: u64,
    /// Code lines.
    pub code: u64,
}

/// Options for line-count retrieval.
///
/// # Examples
///
/// ```
/// use strata_loc::ClocOptions;
///
/// let opts = ClocOptions::default();
/// assert_eq!(opts.cloc_program, "cloc");
/// assert!(opts.cache.is_none());
/// ```
pub struct ClocOptions {
    /// Line-counter executable (default: `"cloc"`).
    pub cloc_program: String,
    /// On-disk memoization; `None` disables caching.
    pub cache: Option<LocCache>,
}

impl Default for ClocOptions {
    fn default() -> Self {
        Self {
            cloc_program: "cloc".into(),
            cache: None,
        }
    }
}

impl ClocOptions {
    /// Options using the given program name and no cache.
    pub fn with_program(cloc_program: impl Into<String>) -> Self {
        Self {
            cloc_program: cloc_program.into(),
            cache: None,
        }
    }
}

/// Count lines of code under `path` with cloc.
///
/// Runs `cloc --csv --by-file --quiet PATH` and parses the report. When a
/// cache is configured, a prior result for the identical invocation is
/// returned without running the tool.
///
/// # Errors
///
/// Returns [`StrataError::Tool`] when cloc fails to run and
/// [`StrataError::Parse`] when its report cannot be interpreted.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use strata_loc::{get_cloc, ClocOptions};
///
/// let mut opts = ClocOptions::default();
/// opts.cloc_program = "cloc".into();
/// let records = get_cloc(Path::new("."), &opts).unwrap();
/// for r in records.iter().take(5) {
///     println!("{} {} {}", r.language, r.path, r.code);
/// }
/// ```
pub fn get_cloc(path: &Path, options: &ClocOptions) -> Result<Vec<LocRecord>> {
    let program = options.cloc_program.as_str();
    let target = path.to_string_lossy().into_owned();
    let args = ["--csv", "--by-file", "--quiet", target.as_str()];

    let key = options
        .cache
        .as_ref()
        .map(|cache| (cache, LocCache::key(program, &args)));
    if let Some((cache, key)) = &key {
        if let Some(records) = cache.load(key) {
            log::debug!("loc cache hit for {program} on {target}");
            return Ok(records);
        }
    }

    let output = run_tool(program, &args, None)?;
    let records = parse_cloc_csv(&output)?;

    if let Some((cache, key)) = &key {
        let command = format!("{program} {}", args.join(" "));
        if let Err(err) = cache.store(key, &command, &records) {
            log::warn!("failed to store loc cache entry: {err}");
        }
    }

    Ok(records)
}

/// Parse cloc's `--csv --by-file` report.
///
/// Header and summary rows are dropped; short rows are skipped with a
/// warning; numeric fields that fail to parse abort with the offending
/// line in the error.
pub(crate) fn parse_cloc_csv(output: &str) -> Result<Vec<LocRecord>> {
    let mut records = Vec::new();
    for line in output.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let fields = split_csv_record(line);
        if fields.len() < 5 {
            log::warn!("skipping short cloc row: {line}");
            continue;
        }
        if fields[0] == "language" || fields[0] == "SUM" || fields[1] == "SUM" {
            continue;
        }
        let parse_field = |index: usize| -> Result<u64> {
            fields[index]
                .parse::<u64>()
                .map_err(|_| StrataError::Parse(format!("bad cloc count in row: {line}")))
        };
        records.push(LocRecord {
            language: fields[0].clone(),
            path: normalize_path(&fields[1]),
            blank: parse_field(2)?,
            comment: parse_field(3)?,
            code: parse_field(4)?,
        });
    }
    Ok(records)
}

fn normalize_path(path: &str) -> String {
    let path = path.replace('\\', "/");
    path.strip_prefix("./").unwrap_or(&path).to_string()
}
