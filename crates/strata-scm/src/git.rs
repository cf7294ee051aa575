//! Git history extraction via the git command-line client.
//!
//! Runs `git log --pretty=format:"[%h] [%an] [%ad] [%s]" --date=iso
//! --numstat` and parses the output into one [`LogEntry`] per
//! (revision, path) pair. Handles binary files, brackets inside commit
//! messages, brace rename syntax, and quoted paths with special
//! characters.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use strata_core::{Result, StrataError};

use crate::entry::{Downloader, FileDownload, LogCollector, LogEntry};
use crate::progress::LogProgress;
use crate::run::run_tool;

const PRETTY_FORMAT: &str = "--pretty=format:[%h] [%an] [%ad] [%s]";

/// Options for log retrieval.
///
/// # Examples
///
/// ```
/// use strata_scm::LogOptions;
///
/// let opts = LogOptions::default();
/// assert_eq!(opts.git_program, "git");
/// assert!(opts.after.is_none());
/// ```
#[derive(Debug, Clone)]
pub struct LogOptions {
    /// Git client executable (default: `"git"`).
    pub git_program: String,
    /// Only include commits after this instant.
    pub after: Option<DateTime<Utc>>,
    /// Only include commits before this instant (default: latest).
    pub before: Option<DateTime<Utc>>,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            git_program: "git".into(),
            after: None,
            before: None,
        }
    }
}

/// Collects commit history by invoking the git client.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use strata_scm::{GitLogCollector, LogCollector, LogOptions};
///
/// let collector = GitLogCollector::new(Path::new("."), LogOptions::default());
/// let log = collector.get_log().unwrap();
/// for entry in log.iter().take(5) {
///     println!("{} {} {}", entry.revision, entry.path, entry.author);
/// }
/// ```
pub struct GitLogCollector {
    repo_path: PathBuf,
    options: LogOptions,
}

impl GitLogCollector {
    /// Create a collector for the repository at `repo_path`.
    pub fn new(repo_path: impl Into<PathBuf>, options: LogOptions) -> Self {
        Self {
            repo_path: repo_path.into(),
            options,
        }
    }

    /// Retrieve the log, reporting progress to `progress` as commit
    /// dates are consumed.
    ///
    /// # Errors
    ///
    /// Returns [`StrataError::Tool`] when the git client fails.
    pub fn get_log_with_progress(&self, progress: &mut LogProgress) -> Result<Vec<LogEntry>> {
        let output = self.run_log()?;
        Ok(parse_log_output(&output, Some(progress)))
    }

    fn run_log(&self) -> Result<String> {
        let mut args: Vec<String> = vec![
            "log".into(),
            PRETTY_FORMAT.into(),
            "--date=iso".into(),
            "--numstat".into(),
        ];
        if let Some(after) = self.options.after {
            args.push("--after".into());
            args.push(after.format("%Y-%m-%d").to_string());
        }
        if let Some(before) = self.options.before {
            args.push("--before".into());
            args.push(before.format("%Y-%m-%d").to_string());
        }
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        run_tool(&self.options.git_program, &arg_refs, Some(&self.repo_path))
    }
}

impl LogCollector for GitLogCollector {
    fn get_log(&self) -> Result<Vec<LogEntry>> {
        let output = self.run_log()?;
        Ok(parse_log_output(&output, None))
    }
}

/// Retrieves file content at a revision via `git show`.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use strata_scm::{Downloader, GitDownloader};
///
/// let downloader = GitDownloader::new(Path::new("."), "git");
/// let file = downloader.download("HEAD", "src/main.rs").unwrap();
/// assert_eq!(file.path, "src/main.rs");
/// ```
pub struct GitDownloader {
    repo_path: PathBuf,
    git_program: String,
}

impl GitDownloader {
    /// Create a downloader for the repository at `repo_path`.
    pub fn new(repo_path: impl Into<PathBuf>, git_program: impl Into<String>) -> Self {
        Self {
            repo_path: repo_path.into(),
            git_program: git_program.into(),
        }
    }
}

impl Downloader for GitDownloader {
    fn download(&self, revision: &str, path: &str) -> Result<FileDownload> {
        let spec = format!("{revision}:{path}");
        let content = run_tool(&self.git_program, &["show", &spec], Some(&self.repo_path))?;
        Ok(FileDownload {
            revision: revision.to_string(),
            path: path.to_string(),
            content,
        })
    }
}

/// Check that `path` is inside a git work tree.
///
/// # Errors
///
/// Returns [`StrataError::Config`] when it is not.
pub fn check_in_repository(path: &Path, git_program: &str) -> Result<()> {
    run_tool(git_program, &["rev-parse", "--git-dir"], Some(path)).map_err(|_| {
        StrataError::Config(format!("not a git repository: {}", path.display()))
    })?;
    Ok(())
}

struct Header {
    revision: String,
    author: String,
    date: DateTime<Utc>,
    message: String,
}

/// Parse raw `git log --numstat` output into log entries.
///
/// Lines that parse as neither a commit header nor a numstat record are
/// skipped with a warning; one garbled line should not abort a whole
/// analysis session.
pub(crate) fn parse_log_output(
    output: &str,
    mut progress: Option<&mut LogProgress>,
) -> Vec<LogEntry> {
    let mut entries = Vec::new();
    let mut header: Option<Header> = None;

    for line in output.lines() {
        if line.trim().is_empty() {
            continue;
        }
        if let Some(parsed) = parse_header(line) {
            if let Some(progress) = progress.as_deref_mut() {
                progress.update(parsed.date);
            }
            header = Some(parsed);
            continue;
        }
        let Some(head) = header.as_ref() else {
            log::warn!("skipping line before any commit header: {line}");
            continue;
        };
        match parse_numstat(line) {
            Some((added, removed, raw_path)) => {
                let (path, copy_from_path) = split_rename(&unquote_path(raw_path));
                if path.is_empty() {
                    log::warn!("skipping numstat entry with empty path in {}", head.revision);
                    continue;
                }
                entries.push(LogEntry {
                    revision: head.revision.clone(),
                    author: head.author.clone(),
                    date: head.date,
                    path,
                    message: head.message.clone(),
                    copy_from_path,
                    added,
                    removed,
                });
            }
            None => log::warn!("skipping unparsable numstat line: {line}"),
        }
    }

    entries
}

/// Parse a `[%h] [%an] [%ad] [%s]` header line.
///
/// The message is the last field, so brackets inside it survive: only the
/// first three `"] ["` separators split fields, the remainder is message.
/// Returns `None` when the line is not a header (e.g. a numstat record
/// whose path happens to start with `[`); the date field disambiguates.
fn parse_header(line: &str) -> Option<Header> {
    let inner = line.strip_prefix('[')?.strip_suffix(']')?;
    let mut parts = inner.splitn(4, "] [");
    let revision = parts.next()?.trim();
    let author = parts.next()?.trim();
    let date_str = parts.next()?.trim();
    let message = parts.next().unwrap_or("").to_string();

    if revision.is_empty() {
        log::warn!("skipping header with empty revision: {line}");
        return None;
    }
    let date = DateTime::parse_from_str(date_str, "%Y-%m-%d %H:%M:%S %z").ok()?;
    Some(Header {
        revision: revision.to_string(),
        author: author.to_string(),
        date: date.with_timezone(&Utc),
        message,
    })
}

/// Parse an `added removed path` numstat line.
///
/// Counts are `-` for binary files. The path is everything after the
/// second count, so paths with internal spaces stay whole.
fn parse_numstat(line: &str) -> Option<(Option<u64>, Option<u64>, &str)> {
    let (added_tok, rest) = next_token(line)?;
    let (removed_tok, path) = next_token(rest)?;
    let path = path.trim_end();
    if path.is_empty() {
        return None;
    }
    Some((parse_count(added_tok)?, parse_count(removed_tok)?, path))
}

fn next_token(s: &str) -> Option<(&str, &str)> {
    let s = s.trim_start();
    if s.is_empty() {
        return None;
    }
    let end = s.find(char::is_whitespace).unwrap_or(s.len());
    Some((&s[..end], &s[end..]))
}

fn parse_count(token: &str) -> Option<Option<u64>> {
    if token == "-" {
        return Some(None);
    }
    token.parse::<u64>().ok().map(Some)
}

/// Resolve git rename syntax into (new path, old path).
///
/// Handles the brace form `dir/{old => new}/file` including empty sides
/// (`{ => sub}`, `{old => }`) and the whole-path form `old => new`.
fn split_rename(path: &str) -> (String, Option<String>) {
    if let (Some(open), Some(close)) = (path.find('{'), path.rfind('}')) {
        if open < close {
            let middle = &path[open + 1..close];
            if let Some((old_mid, new_mid)) = middle.split_once(" => ") {
                let prefix = &path[..open];
                let suffix = &path[close + 1..];
                let new_path = collapse(&format!("{prefix}{new_mid}{suffix}"));
                let old_path = collapse(&format!("{prefix}{old_mid}{suffix}"));
                return (new_path, Some(old_path));
            }
        }
    }
    if let Some((old, new)) = path.split_once(" => ") {
        return (new.trim().to_string(), Some(old.trim().to_string()));
    }
    (path.to_string(), None)
}

fn collapse(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut prev_slash = false;
    for c in path.chars() {
        if c == '/' {
            if prev_slash {
                continue;
            }
            prev_slash = true;
        } else {
            prev_slash = false;
        }
        out.push(c);
    }
    out
}

/// Undo git's C-style path quoting.
///
/// Git wraps paths containing unusual bytes in double quotes and escapes
/// them (`\"`, `\\`, `\t`, `\n`, and octal `\NNN`). Mishandling these was
/// a long-standing source of silently wrong paths.
fn unquote_path(raw: &str) -> String {
    let Some(inner) = raw
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
    else {
        return raw.to_string();
    };

    let mut bytes: Vec<u8> = Vec::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            let mut buf = [0u8; 4];
            bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            continue;
        }
        match chars.next() {
            Some('\\') => bytes.push(b'\\'),
            Some('"') => bytes.push(b'"'),
            Some('t') => bytes.push(b'\t'),
            Some('n') => bytes.push(b'\n'),
            Some('r') => bytes.push(b'\r'),
            Some(d @ '0'..='7') => {
                let mut value = d as u32 - '0' as u32;
                for _ in 0..2 {
                    match chars.peek() {
                        Some(&n @ '0'..='7') => {
                            value = value * 8 + (n as u32 - '0' as u32);
                            chars.next();
                        }
                        _ => break,
                    }
                }
                bytes.push(value as u8);
            }
            Some(other) => {
                let mut buf = [0u8; 4];
                bytes.extend_from_slice(other.encode_utf8(&mut buf).as_bytes());
            }
            None => break,
        }
    }
    String::from_utf8_lossy(&bytes).into_owned()
}
