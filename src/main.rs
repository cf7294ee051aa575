use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use miette::{IntoDiagnostic, Result};

use strata_core::{OutputFormat, StrataConfig};
use strata_loc::{get_cloc, list_files, ClocOptions, LocCache, LocRecord};
use strata_metrics::{
    ages, ages_by, co_changes, component_map, components, hot_spots, mass_changes,
    ChangeGranularity, CoChange, CochangeKey, FileAge, HotSpot, HotSpotOptions, JoinPolicy,
    MassChange, PathComponent,
};
use strata_scm::{
    GitDownloader, GitLogCollector, LogCollector, LogEntry, LogOptions, LogProgress,
};

#[derive(Parser)]
#[command(
    name = "strata",
    version,
    about = "Code metrics mined from source control",
    long_about = "Strata mines your source control history and external tools to produce\n\
                   descriptive code metrics: file ages, churn \u{d7} size hot spots, co-change\n\
                   coupling, mass change sets, and per-function complexity.\n\n\
                   Examples:\n  \
                     strata hotspots --path .        Rank files by size and change frequency\n  \
                     strata coupling --on ticket     Files that change under the same ticket\n  \
                     strata ages --by component      Age of last change per component\n  \
                     strata complexity src/main.rs   Per-function cyclomatic complexity\n  \
                     strata hotspots --format vega   Emit a Vega-Lite chart spec\n  \
                     strata doctor                   Check setup and external tools"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to configuration file (default: .strata.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        global = true,
        default_value = "text",
        long_help = "Output format for command results.\n\n\
                       Formats:\n  \
                         text      Human-readable tables and summaries (default)\n  \
                         json      Machine-readable JSON with camelCase keys\n  \
                         markdown  GitHub-flavored Markdown\n  \
                         vega      Vega-Lite chart spec (report subcommands only)"
    )]
    format: OutputFormat,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    verbose: bool,

    /// When to use colors
    #[arg(long, global = true, default_value = "auto")]
    color: ColorChoice,
}

#[derive(Subcommand)]
enum Command {
    /// Show the parsed change log
    #[command(long_about = "Show the parsed change log.\n\n\
        Runs the git client and parses its numstat output into one row per\n\
        (revision, path) pair, with added/removed line counts and rename tracking.\n\n\
        Examples:\n  strata log --path . --after 2024-01-01\n  strata log --format json")]
    Log {
        /// Repository path (default: current directory)
        #[arg(long, default_value = ".")]
        path: PathBuf,

        /// Only include commits after this date (default: config since_days ago)
        #[arg(long)]
        after: Option<NaiveDate>,

        /// Only include commits before this date
        #[arg(long)]
        before: Option<NaiveDate>,

        /// Maximum rows to show
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Count lines of code with cloc
    #[command(long_about = "Count lines of code with cloc.\n\n\
        Runs cloc --csv --by-file and parses the report. Results are cached\n\
        under the cache directory keyed by the exact invocation, so repeated\n\
        runs are cheap.\n\n\
        Examples:\n  strata loc --path src\n  strata loc --no-cache")]
    Loc {
        /// Directory to count (default: current directory)
        #[arg(long, default_value = ".")]
        path: PathBuf,

        /// Bypass the on-disk cache
        #[arg(long)]
        no_cache: bool,

        /// Maximum rows to show
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Age of the last change per file or component
    #[command(long_about = "Age of the last change per file or component.\n\n\
        Groups the log by path (or component label), takes the most recent\n\
        change, and reports elapsed time in fractional days.\n\n\
        Examples:\n  strata ages --path .\n  strata ages --by component --chart ages.html")]
    Ages {
        /// Repository path (default: current directory)
        #[arg(long, default_value = ".")]
        path: PathBuf,

        /// Only include commits after this date
        #[arg(long)]
        after: Option<NaiveDate>,

        /// Only include commits before this date
        #[arg(long)]
        before: Option<NaiveDate>,

        /// Aggregation level
        #[arg(long, value_enum, default_value = "path")]
        by: GroupBy,

        /// Maximum rows to show
        #[arg(long)]
        limit: Option<usize>,

        /// Write an HTML chart page to this file
        #[arg(long)]
        chart: Option<PathBuf>,
    },
    /// Rank files by size and change frequency
    #[command(
        long_about = "Rank files by size and change frequency.\n\n\
        Joins cloc line counts with per-path change counts from the log and\n\
        ranks by a composite of min-max normalized size and change scores.\n\n\
        Examples:\n  strata hotspots --path .\n  strata hotspots --per day --join inner\n  strata hotspots --format vega > hotspots.vl.json"
    )]
    Hotspots {
        /// Repository path (default: current directory)
        #[arg(long, default_value = ".")]
        path: PathBuf,

        /// Only include commits after this date
        #[arg(long)]
        after: Option<NaiveDate>,

        /// Only include commits before this date
        #[arg(long)]
        before: Option<NaiveDate>,

        /// Count one change per revision or per day
        #[arg(long, value_enum, default_value = "revision")]
        per: PerArg,

        /// Join policy for paths present on only one side
        #[arg(long, value_enum, default_value = "outer")]
        join: JoinArg,

        /// Bypass the loc cache
        #[arg(long)]
        no_cache: bool,

        /// Maximum rows to show
        #[arg(long)]
        limit: Option<usize>,

        /// Write an HTML chart page to this file
        #[arg(long)]
        chart: Option<PathBuf>,
    },
    /// Files that change together
    #[command(
        long_about = "Files that change together.\n\n\
        Counts how often pairs of paths change under the same join key\n\
        (revision, day, or ticket id from commit messages) and derives a\n\
        directed coupling ratio in [0, 1].\n\n\
        Examples:\n  strata coupling --path .\n  strata coupling --on ticket --min-coupling 0.5"
    )]
    Coupling {
        /// Repository path (default: current directory)
        #[arg(long, default_value = ".")]
        path: PathBuf,

        /// Only include commits after this date
        #[arg(long)]
        after: Option<NaiveDate>,

        /// Only include commits before this date
        #[arg(long)]
        before: Option<NaiveDate>,

        /// Join key for "changed together"
        #[arg(long, value_enum, default_value = "revision")]
        on: OnArg,

        /// Hide pairs below this coupling ratio (default: config)
        #[arg(long)]
        min_coupling: Option<f64>,

        /// Maximum rows to show
        #[arg(long)]
        limit: Option<usize>,

        /// Write an HTML chart page to this file
        #[arg(long)]
        chart: Option<PathBuf>,
    },
    /// Revisions touching an unusual number of paths
    #[command(long_about = "Revisions touching an unusual number of paths.\n\n\
        Mass changes (refactors, reformats, generated churn) distort coupling\n\
        analysis; this lists revisions above the threshold so they can be\n\
        reviewed or excluded.\n\n\
        Examples:\n  strata mass-changes --threshold 25")]
    MassChanges {
        /// Repository path (default: current directory)
        #[arg(long, default_value = ".")]
        path: PathBuf,

        /// Only include commits after this date
        #[arg(long)]
        after: Option<NaiveDate>,

        /// Only include commits before this date
        #[arg(long)]
        before: Option<NaiveDate>,

        /// Revisions with more paths than this are reported (default: config)
        #[arg(long)]
        threshold: Option<u64>,
    },
    /// Per-function cyclomatic complexity at a revision
    #[command(long_about = "Per-function cyclomatic complexity at a revision.\n\n\
        Fetches the file content at the revision via the git client and runs\n\
        the lizard analyzer over it.\n\n\
        Examples:\n  strata complexity src/main.rs\n  strata complexity src/git.rs --rev v0.2.0")]
    Complexity {
        /// File path within the repository
        file: String,

        /// Revision to analyze (default: HEAD)
        #[arg(long, default_value = "HEAD")]
        rev: String,

        /// Repository path (default: current directory)
        #[arg(long, default_value = ".")]
        path: PathBuf,
    },
    /// Component label for each file in the working tree
    #[command(long_about = "Component label for each file in the working tree.\n\n\
        Components are the leading directory segments of a path; other reports\n\
        can aggregate at this level with --by component.\n\n\
        Examples:\n  strata components --depth 1")]
    Components {
        /// Directory to scan (default: current directory)
        #[arg(long, default_value = ".")]
        path: PathBuf,

        /// Directory segments forming a component (default: config)
        #[arg(long)]
        depth: Option<usize>,
    },
    /// Create a default .strata.toml configuration file
    #[command(long_about = "Create a default .strata.toml configuration file.\n\n\
        Generates a commented-out template with all available options.\n\
        Fails if .strata.toml already exists.")]
    Init,
    /// Check your strata setup and environment
    #[command(long_about = "Check your strata setup and environment.\n\n\
        Runs diagnostics for the git repository, config file, external tools\n\
        (git, cloc, lizard), loc cache, and git history. Use --format json\n\
        for machine-readable output.")]
    Doctor,
    /// Generate shell completion scripts
    #[command(hide = true)]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum GroupBy {
    /// One row per file path
    Path,
    /// One row per component label
    Component,
}

#[derive(Clone, Copy, ValueEnum)]
enum PerArg {
    /// One change per revision
    Revision,
    /// One change per calendar day
    Day,
}

#[derive(Clone, Copy, ValueEnum)]
enum JoinArg {
    /// Zero-fill paths present on one side only
    Outer,
    /// Drop paths present on one side only
    Inner,
}

#[derive(Clone, Copy, ValueEnum)]
enum OnArg {
    /// Same revision
    Revision,
    /// Same calendar day
    Day,
    /// Same ticket id in the commit message
    Ticket,
}

#[derive(Clone, PartialEq, Eq, ValueEnum)]
enum ColorChoice {
    /// Auto-detect based on terminal
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<PerArg> for ChangeGranularity {
    fn from(value: PerArg) -> Self {
        match value {
            PerArg::Revision => ChangeGranularity::Revision,
            PerArg::Day => ChangeGranularity::Day,
        }
    }
}

impl From<JoinArg> for JoinPolicy {
    fn from(value: JoinArg) -> Self {
        match value {
            JoinArg::Outer => JoinPolicy::Outer,
            JoinArg::Inner => JoinPolicy::Inner,
        }
    }
}

impl From<OnArg> for CochangeKey {
    fn from(value: OnArg) -> Self {
        match value {
            OnArg::Revision => CochangeKey::Revision,
            OnArg::Day => CochangeKey::Day,
            OnArg::Ticket => CochangeKey::Ticket,
        }
    }
}

fn print_welcome(use_color: bool) {
    let version = env!("CARGO_PKG_VERSION");

    if use_color {
        println!("\x1b[1m\x1b[33m\u{2248}\x1b[0m \x1b[1mstrata\x1b[0m v{version} — code metrics mined from source control\n");

        println!("Quick start:");
        println!("  \x1b[36mstrata init\x1b[0m                   Create a .strata.toml config file");
        println!("  \x1b[36mstrata hotspots --path .\x1b[0m      Rank files by size and change frequency");
        println!("  \x1b[36mstrata doctor\x1b[0m                 Check setup and external tools\n");

        println!("All commands:");
        println!("  \x1b[32mlog\x1b[0m           Parsed change log from the git client");
        println!("  \x1b[32mloc\x1b[0m           Lines of code per file via cloc");
        println!("  \x1b[32mages\x1b[0m          Age of last change per file or component");
        println!("  \x1b[32mhotspots\x1b[0m      Size \u{d7} change-frequency ranking");
        println!("  \x1b[32mcoupling\x1b[0m      Files that change together");
        println!("  \x1b[32mmass-changes\x1b[0m  Revisions touching many paths");
        println!("  \x1b[32mcomplexity\x1b[0m    Per-function complexity at a revision");
        println!("  \x1b[32mcomponents\x1b[0m    Component label per file");
        println!("  \x1b[32mdoctor\x1b[0m        Check your setup and environment");
        println!("  \x1b[32minit\x1b[0m          Create default configuration\n");
    } else {
        println!("strata v{version} — code metrics mined from source control\n");

        println!("Quick start:");
        println!("  strata init                   Create a .strata.toml config file");
        println!("  strata hotspots --path .      Rank files by size and change frequency");
        println!("  strata doctor                 Check setup and external tools\n");

        println!("All commands:");
        println!("  log           Parsed change log from the git client");
        println!("  loc           Lines of code per file via cloc");
        println!("  ages          Age of last change per file or component");
        println!("  hotspots      Size x change-frequency ranking");
        println!("  coupling      Files that change together");
        println!("  mass-changes  Revisions touching many paths");
        println!("  complexity    Per-function complexity at a revision");
        println!("  components    Component label per file");
        println!("  doctor        Check your setup and environment");
        println!("  init          Create default configuration\n");
    }

    println!("Run 'strata <command> --help' for details.");
}

fn to_utc(date: NaiveDate) -> DateTime<Utc> {
    DateTime::from_naive_utc_and_offset(date.and_hms_opt(0, 0, 0).unwrap(), Utc)
}

/// Resolve the mining window: explicit dates win, otherwise the window
/// reaches back `since_days` from now.
fn resolve_window(
    after: Option<NaiveDate>,
    before: Option<NaiveDate>,
    config: &StrataConfig,
) -> (DateTime<Utc>, Option<DateTime<Utc>>) {
    let after = after
        .map(to_utc)
        .unwrap_or_else(|| Utc::now() - chrono::Duration::days(config.scm.since_days as i64));
    (after, before.map(to_utc))
}

fn collect_log(
    path: &Path,
    after: DateTime<Utc>,
    before: Option<DateTime<Utc>>,
    config: &StrataConfig,
) -> Result<Vec<LogEntry>> {
    if strata_scm::git::check_in_repository(path, &config.scm.git_program).is_err() {
        miette::bail!(miette::miette!(
            help = "Run strata from inside a git repository, or point --path at one",
            "Not a git repository: {}",
            path.display()
        ));
    }

    let options = LogOptions {
        git_program: config.scm.git_program.clone(),
        after: Some(after),
        before,
    };
    let collector = GitLogCollector::new(path, options);

    let entries = if std::io::stderr().is_terminal() {
        eprintln!("Mining history at {} ...", path.display());
        let mut progress = LogProgress::new(after, Utc::now());
        let entries = collector
            .get_log_with_progress(&mut progress)
            .into_diagnostic()?;
        progress.finish();
        entries
    } else {
        collector.get_log().into_diagnostic()?
    };

    let revisions: std::collections::HashSet<&str> =
        entries.iter().map(|e| e.revision.as_str()).collect();
    eprintln!(
        "Analyzed {} revisions ({} file changes).",
        revisions.len(),
        entries.len()
    );
    Ok(entries)
}

fn run_loc(path: &Path, config: &StrataConfig, no_cache: bool) -> Result<Vec<LocRecord>> {
    let cache = (config.loc.cache && !no_cache)
        .then(|| LocCache::new(&config.loc.cache_dir));
    let options = ClocOptions {
        cloc_program: config.loc.cloc_program.clone(),
        cache,
    };

    let is_tty = std::io::stderr().is_terminal();
    let spinner = if is_tty {
        let pb = indicatif::ProgressBar::new_spinner();
        pb.set_style(
            indicatif::ProgressStyle::with_template("{spinner:.cyan} {msg} ({elapsed})").unwrap(),
        );
        pb.set_message(format!("Counting lines at {} ...", path.display()));
        pb.enable_steady_tick(std::time::Duration::from_millis(120));
        Some(pb)
    } else {
        None
    };

    let result = get_cloc(path, &options);
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    match result {
        Ok(records) => Ok(records),
        Err(err @ strata_core::StrataError::Tool { .. }) => {
            miette::bail!(miette::miette!(
                help = "Install cloc (https://github.com/AlDanial/cloc) or set loc.cloc_program in .strata.toml",
                "{err}"
            ));
        }
        Err(err) => Err(err).into_diagnostic(),
    }
}

fn truncated<T>(rows: Vec<T>, limit: usize) -> Vec<T> {
    rows.into_iter().take(limit).collect()
}

fn write_chart(path: &Path, title: &str, charts: Vec<(String, serde_json::Value)>) -> Result<()> {
    let page = strata_viz::render_page(title, &charts);
    std::fs::write(path, page).into_diagnostic()?;
    eprintln!("Wrote chart page to {}", path.display());
    Ok(())
}

fn bail_vega_unsupported() -> Result<()> {
    miette::bail!("Vega output is only supported for the ages, hotspots, and coupling subcommands.")
}

fn print_log(entries: &[LogEntry], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(entries).into_diagnostic()?
            );
        }
        OutputFormat::Markdown => {
            println!("| Revision | Date | Author | +/− | Path | Message |");
            println!("|----------|------|--------|-----|------|---------|");
            for e in entries {
                println!(
                    "| {} | {} | {} | {}/{} | `{}` | {} |",
                    e.revision,
                    e.date.format("%Y-%m-%d"),
                    e.author,
                    count(e.added),
                    count(e.removed),
                    e.path,
                    e.message,
                );
            }
        }
        OutputFormat::Text => {
            for e in entries {
                println!(
                    "{}  {}  {:<20} +{:<5} -{:<5} {}",
                    e.revision,
                    e.date.format("%Y-%m-%d"),
                    e.author,
                    count(e.added),
                    count(e.removed),
                    e.path,
                );
            }
        }
        OutputFormat::Vega => bail_vega_unsupported()?,
    }
    Ok(())
}

fn count(value: Option<u64>) -> String {
    value.map_or_else(|| "-".into(), |v| v.to_string())
}

fn print_loc(records: &[LocRecord], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(records).into_diagnostic()?
            );
        }
        OutputFormat::Markdown => {
            println!("| Language | Path | Blank | Comment | Code |");
            println!("|----------|------|-------|---------|------|");
            for r in records {
                println!(
                    "| {} | `{}` | {} | {} | {} |",
                    r.language, r.path, r.blank, r.comment, r.code,
                );
            }
        }
        OutputFormat::Text => {
            println!("{:<12} {:<48} {:>6} {:>8} {:>6}", "language", "path", "blank", "comment", "code");
            println!("{:-<84}", "");
            for r in records {
                println!(
                    "{:<12} {:<48} {:>6} {:>8} {:>6}",
                    r.language, r.path, r.blank, r.comment, r.code,
                );
            }
        }
        OutputFormat::Vega => bail_vega_unsupported()?,
    }
    Ok(())
}

fn print_ages(report: &[FileAge], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(report).into_diagnostic()?
            );
        }
        OutputFormat::Markdown => {
            println!("| Path | Last change | Age (days) |");
            println!("|------|-------------|------------|");
            for a in report {
                println!(
                    "| `{}` | {} | {:.1} |",
                    a.path,
                    a.last_change.format("%Y-%m-%d"),
                    a.age_days,
                );
            }
        }
        OutputFormat::Text => {
            for a in report {
                println!(
                    "{:<56} {}  {:>8.1} days",
                    a.path,
                    a.last_change.format("%Y-%m-%d"),
                    a.age_days,
                );
            }
        }
        OutputFormat::Vega => {
            println!(
                "{}",
                serde_json::to_string_pretty(&strata_viz::ages_bars(report)).into_diagnostic()?
            );
        }
    }
    Ok(())
}

fn print_hotspots(report: &[HotSpot], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(report).into_diagnostic()?
            );
        }
        OutputFormat::Markdown => {
            println!("| Rank | Path | Score | Changes | Code | Language |");
            println!("|------|------|-------|---------|------|----------|");
            for (i, h) in report.iter().enumerate() {
                println!(
                    "| {} | `{}` | {:.2} | {} | {} | {} |",
                    i + 1,
                    h.path,
                    h.score,
                    h.changes,
                    h.lines,
                    h.language,
                );
            }
        }
        OutputFormat::Text => {
            for (i, h) in report.iter().enumerate() {
                println!(
                    "{:>3}. {:<48} score={:.2}  changes={:<4} code={:<6} {}",
                    i + 1,
                    h.path,
                    h.score,
                    h.changes,
                    h.lines,
                    h.language,
                );
            }
        }
        OutputFormat::Vega => {
            println!(
                "{}",
                serde_json::to_string_pretty(&strata_viz::hotspot_scatter(report))
                    .into_diagnostic()?
            );
        }
    }
    Ok(())
}

fn print_coupling(report: &[CoChange], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(report).into_diagnostic()?
            );
        }
        OutputFormat::Markdown => {
            println!("| Primary | Dependency | Coupling | Co-changes | Changes |");
            println!("|---------|------------|----------|------------|---------|");
            for p in report {
                println!(
                    "| `{}` | `{}` | {:.2} | {} | {} |",
                    p.primary, p.dependency, p.coupling, p.cochanges, p.changes,
                );
            }
        }
        OutputFormat::Text => {
            for p in report {
                println!(
                    "{:<40} -> {:<40} coupling={:.2} ({}/{})",
                    p.primary, p.dependency, p.coupling, p.cochanges, p.changes,
                );
            }
        }
        OutputFormat::Vega => {
            println!(
                "{}",
                serde_json::to_string_pretty(&strata_viz::coupling_heatmap(report))
                    .into_diagnostic()?
            );
        }
    }
    Ok(())
}

fn print_mass_changes(report: &[MassChange], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(report).into_diagnostic()?
            );
        }
        OutputFormat::Markdown => {
            println!("| Revision | Paths | Author | Message |");
            println!("|----------|-------|--------|---------|");
            for m in report {
                println!(
                    "| {} | {} | {} | {} |",
                    m.revision, m.path_count, m.author, m.message,
                );
            }
        }
        OutputFormat::Text => {
            for m in report {
                println!(
                    "{}  {:>4} paths  {:<20} {}",
                    m.revision, m.path_count, m.author, m.message,
                );
            }
        }
        OutputFormat::Vega => bail_vega_unsupported()?,
    }
    Ok(())
}

fn print_components(report: &[PathComponent], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(report).into_diagnostic()?
            );
        }
        OutputFormat::Markdown => {
            println!("| Component | Path |");
            println!("|-----------|------|");
            for pc in report {
                println!("| {} | `{}` |", pc.component, pc.path);
            }
        }
        OutputFormat::Text => {
            for pc in report {
                println!("{:<32} {}", pc.component, pc.path);
            }
        }
        OutputFormat::Vega => bail_vega_unsupported()?,
    }
    Ok(())
}

#[derive(serde::Serialize)]
struct CheckResult {
    name: &'static str,
    status: &'static str,
    detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    hint: Option<String>,
}

impl CheckResult {
    fn pass(name: &'static str, detail: impl Into<String>) -> Self {
        Self {
            name,
            status: "pass",
            detail: detail.into(),
            hint: None,
        }
    }

    fn fail(name: &'static str, detail: impl Into<String>, hint: impl Into<String>) -> Self {
        Self {
            name,
            status: "fail",
            detail: detail.into(),
            hint: Some(hint.into()),
        }
    }

    fn info(name: &'static str, detail: impl Into<String>) -> Self {
        Self {
            name,
            status: "info",
            detail: detail.into(),
            hint: None,
        }
    }

    fn symbol(&self) -> &'static str {
        match self.status {
            "pass" => "\u{2713}",
            "fail" => "\u{2717}",
            _ => "~",
        }
    }

    fn colored_symbol(&self) -> String {
        match self.status {
            "pass" => "\x1b[32m\u{2713}\x1b[0m".into(),
            "fail" => "\x1b[31m\u{2717}\x1b[0m".into(),
            _ => "\x1b[33m~\x1b[0m".into(),
        }
    }
}

fn tool_check(
    name: &'static str,
    program: &str,
    install_hint: &str,
) -> CheckResult {
    match strata_scm::run_tool(program, &["--version"], None) {
        Ok(output) => {
            let first_line = output.lines().next().unwrap_or("").trim().to_string();
            CheckResult::pass(name, first_line)
        }
        Err(_) => CheckResult::fail(
            name,
            format!("{program} not runnable"),
            install_hint.to_string(),
        ),
    }
}

fn run_doctor(config: &StrataConfig, format: OutputFormat, use_color: bool) -> Result<()> {
    let mut checks: Vec<CheckResult> = Vec::new();

    // 1. Git repository
    let mut git_root = None;
    let cwd = std::env::current_dir().into_diagnostic()?;
    let mut dir = cwd.as_path();
    loop {
        if dir.join(".git").exists() {
            git_root = Some(dir.to_path_buf());
            break;
        }
        let Some(parent) = dir.parent() else {
            break;
        };
        dir = parent;
    }
    match &git_root {
        Some(root) => checks.push(CheckResult::pass(
            "git_repository",
            format!("detected at {}", root.display()),
        )),
        None => checks.push(CheckResult::fail(
            "git_repository",
            "not a git repository",
            "run strata from inside a git repository",
        )),
    }

    // 2. Config file
    if Path::new(".strata.toml").exists() {
        checks.push(CheckResult::pass("config_file", ".strata.toml found"));
    } else {
        checks.push(CheckResult::fail(
            "config_file",
            ".strata.toml not found",
            "run 'strata init' to create a default config",
        ));
    }

    // 3-5. External tools
    checks.push(tool_check(
        "git_client",
        &config.scm.git_program,
        "install git or set scm.git_program in .strata.toml",
    ));
    checks.push(tool_check(
        "cloc",
        &config.loc.cloc_program,
        "install cloc (https://github.com/AlDanial/cloc) or set loc.cloc_program",
    ));
    checks.push(tool_check(
        "lizard",
        &config.complexity.lizard_program,
        "pip install lizard, or set complexity.lizard_program",
    ));

    // 6. Loc cache
    let cache_dir = Path::new(&config.loc.cache_dir);
    if cache_dir.is_dir() {
        let entries = std::fs::read_dir(cache_dir)
            .map(|read| {
                read.filter_map(|e| e.ok())
                    .filter(|e| e.file_name().to_string_lossy().starts_with("loc-"))
                    .count()
            })
            .unwrap_or(0);
        checks.push(CheckResult::pass(
            "loc_cache",
            format!("{} ({entries} entries)", cache_dir.display()),
        ));
    } else {
        checks.push(CheckResult::info(
            "loc_cache",
            "not found (created on first 'strata loc' run)",
        ));
    }

    // 7. Git history
    if git_root.is_some() {
        let since = format!("--since={} days ago", config.scm.since_days);
        match strata_scm::run_tool(
            &config.scm.git_program,
            &["rev-list", "--count", "HEAD", &since],
            Some(&cwd),
        ) {
            Ok(output) => checks.push(CheckResult::info(
                "git_history",
                format!(
                    "{} commits in last {} days",
                    output.trim(),
                    config.scm.since_days
                ),
            )),
            Err(_) => checks.push(CheckResult::info(
                "git_history",
                "unable to read git history",
            )),
        }
    }

    // Output
    match format {
        OutputFormat::Json => {
            let version = env!("CARGO_PKG_VERSION");
            let json = serde_json::json!({
                "version": version,
                "checks": checks,
            });
            println!("{}", serde_json::to_string_pretty(&json).into_diagnostic()?);
        }
        _ => {
            let version = env!("CARGO_PKG_VERSION");
            println!("strata v{version} — Environment Check\n");

            for check in &checks {
                let sym = if use_color {
                    check.colored_symbol()
                } else {
                    check.symbol().to_string()
                };
                let label = check.name.replace('_', " ");
                println!("  {sym} {label:<16} {}", check.detail);
                if let Some(hint) = &check.hint {
                    println!("    hint: {hint}");
                }
            }

            let passed = checks.iter().filter(|c| c.status == "pass").count();
            let failed = checks.iter().filter(|c| c.status == "fail").count();
            let info = checks.iter().filter(|c| c.status == "info").count();
            println!("\n{passed} checks passed, {failed} failed, {info} info");
        }
    }

    Ok(())
}

const DEFAULT_CONFIG: &str = r#"# strata configuration
# See: https://github.com/jdelacroix/strata

[scm]
# Git client executable and default mining window
# git_program = "git"
# since_days = 365

[loc]
# Line counter and on-disk memoization of its reports
# cloc_program = "cloc"
# cache = true
# cache_dir = ".strata"

[complexity]
# Per-function complexity analyzer
# lizard_program = "lizard"

[report]
# limit = 20
# mass_change_threshold = 10
# component_depth = 2
# min_coupling = 0.0
"#;

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .build(),
        )
    }))
    .expect("miette handler");
    human_panic::setup_panic!();
    env_logger::init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => StrataConfig::from_file(path).into_diagnostic()?,
        None => {
            let default_path = Path::new(".strata.toml");
            if default_path.exists() {
                StrataConfig::from_file(default_path).into_diagnostic()?
            } else {
                StrataConfig::default()
            }
        }
    };

    let use_color = match cli.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => std::io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    };

    if cli.verbose {
        eprintln!("format: {}", cli.format);
        eprintln!(
            "git: {} | cloc: {} | lizard: {}",
            config.scm.git_program, config.loc.cloc_program, config.complexity.lizard_program,
        );
    }

    match cli.command {
        None => {
            print_welcome(use_color);
            return Ok(());
        }
        Some(Command::Log {
            ref path,
            after,
            before,
            limit,
        }) => {
            let (after, before) = resolve_window(after, before, &config);
            let entries = collect_log(path, after, before, &config)?;
            let limit = limit.unwrap_or(usize::MAX);
            print_log(&truncated(entries, limit), cli.format)?;
        }
        Some(Command::Loc {
            ref path,
            no_cache,
            limit,
        }) => {
            let records = run_loc(path, &config, no_cache)?;
            let limit = limit.unwrap_or(usize::MAX);
            print_loc(&truncated(records, limit), cli.format)?;
        }
        Some(Command::Ages {
            ref path,
            after,
            before,
            by,
            limit,
            ref chart,
        }) => {
            let (after, before) = resolve_window(after, before, &config);
            let entries = collect_log(path, after, before, &config)?;
            let now = Utc::now();
            let report = match by {
                GroupBy::Path => ages(&entries, now),
                GroupBy::Component => {
                    let depth = config.report.component_depth;
                    let map = component_map(entries.iter().map(|e| e.path.as_str()), depth);
                    ages_by(&entries, |e| map.get(&e.path).cloned(), now)
                }
            };
            let report = truncated(report, limit.unwrap_or(config.report.limit));
            if let Some(chart_path) = chart {
                write_chart(
                    chart_path,
                    "strata — ages",
                    vec![("Age of last change".into(), strata_viz::ages_bars(&report))],
                )?;
            }
            print_ages(&report, cli.format)?;
        }
        Some(Command::Hotspots {
            ref path,
            after,
            before,
            per,
            join,
            no_cache,
            limit,
            ref chart,
        }) => {
            let (after, before) = resolve_window(after, before, &config);
            let entries = collect_log(path, after, before, &config)?;
            let records = run_loc(path, &config, no_cache)?;
            let options = HotSpotOptions {
                granularity: per.into(),
                join: join.into(),
            };
            let report = hot_spots(&entries, &records, &options);
            let report = truncated(report, limit.unwrap_or(config.report.limit));
            if let Some(chart_path) = chart {
                write_chart(
                    chart_path,
                    "strata — hot spots",
                    vec![("Hot spots".into(), strata_viz::hotspot_scatter(&report))],
                )?;
            }
            print_hotspots(&report, cli.format)?;
        }
        Some(Command::Coupling {
            ref path,
            after,
            before,
            on,
            min_coupling,
            limit,
            ref chart,
        }) => {
            let (after, before) = resolve_window(after, before, &config);
            let entries = collect_log(path, after, before, &config)?;
            let min_coupling = min_coupling.unwrap_or(config.report.min_coupling);
            let report: Vec<CoChange> = co_changes(&entries, on.into())
                .into_iter()
                .filter(|p| p.coupling >= min_coupling)
                .collect();
            let report = truncated(report, limit.unwrap_or(config.report.limit));
            if let Some(chart_path) = chart {
                write_chart(
                    chart_path,
                    "strata — coupling",
                    vec![(
                        "Co-change coupling".into(),
                        strata_viz::coupling_heatmap(&report),
                    )],
                )?;
            }
            print_coupling(&report, cli.format)?;
        }
        Some(Command::MassChanges {
            ref path,
            after,
            before,
            threshold,
        }) => {
            let (after, before) = resolve_window(after, before, &config);
            let entries = collect_log(path, after, before, &config)?;
            let threshold = threshold.unwrap_or(config.report.mass_change_threshold);
            let report = mass_changes(&entries, threshold);
            print_mass_changes(&report, cli.format)?;
        }
        Some(Command::Complexity {
            ref file,
            ref rev,
            ref path,
        }) => {
            if cli.format == OutputFormat::Vega {
                bail_vega_unsupported()?;
            }
            let downloader = GitDownloader::new(path, config.scm.git_program.clone());
            let options = strata_complexity::LizardOptions {
                lizard_program: config.complexity.lizard_program.clone(),
            };
            let report =
                match strata_complexity::get_complexity(file, rev, &downloader, &options) {
                    Ok(report) => report,
                    Err(err @ strata_core::StrataError::Tool { .. }) => {
                        miette::bail!(miette::miette!(
                            help = "Check that the file exists at the revision and that lizard is installed (pip install lizard)",
                            "{err}"
                        ));
                    }
                    Err(err) => return Err(err).into_diagnostic(),
                };

            match cli.format {
                OutputFormat::Json => {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&report).into_diagnostic()?
                    );
                }
                OutputFormat::Markdown => {
                    println!("# Complexity: `{}` @ {}\n", report.path, report.revision);
                    println!("| Function | CCN | NLOC | Tokens | Lines |");
                    println!("|----------|-----|------|--------|-------|");
                    for f in &report.functions {
                        println!(
                            "| `{}` | {} | {} | {} | {}–{} |",
                            f.name, f.cyclomatic, f.nloc, f.tokens, f.start_line, f.end_line,
                        );
                    }
                }
                OutputFormat::Text => {
                    println!("{} @ {}", report.path, report.revision);
                    println!("{:-<72}", "");
                    for f in &report.functions {
                        println!(
                            "  {:<40} ccn={:<4} nloc={:<5} tokens={:<6} lines {}..{}",
                            f.name, f.cyclomatic, f.nloc, f.tokens, f.start_line, f.end_line,
                        );
                    }
                    println!(
                        "  total: {} functions, nloc={}, tokens={}",
                        report.functions.len(),
                        report.total_nloc,
                        report.total_tokens,
                    );
                }
                OutputFormat::Vega => unreachable!(),
            }
        }
        Some(Command::Components { ref path, depth }) => {
            let depth = depth.unwrap_or(config.report.component_depth);
            let files = list_files(path).into_diagnostic()?;
            let report = components(&files, depth);
            print_components(&report, cli.format)?;
        }
        Some(Command::Init) => {
            let path = Path::new(".strata.toml");
            if path.exists() {
                miette::bail!(".strata.toml already exists");
            }
            std::fs::write(path, DEFAULT_CONFIG).into_diagnostic()?;
            println!("Created .strata.toml with default configuration");
        }
        Some(Command::Doctor) => {
            run_doctor(&config, cli.format, use_color)?;
        }
        Some(Command::Completions { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "strata", &mut std::io::stdout());
        }
    }

    Ok(())
}
