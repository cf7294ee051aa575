//! lizard invocation and report parsing.

use std::io::Write;

use serde::{Deserialize, Serialize};
use strata_core::{split_csv_record, Result, StrataError};
use strata_scm::{run_tool, Downloader};

/// Complexity metrics for a single function.
///
/// # Examples
///
/// ```
/// use strata_complexity::FunctionComplexity;
///
/// let f = FunctionComplexity {
///     name: "parse_header".into(),
///     long_name: "parse_header( line )".into(),
///     cyclomatic: 7,
///     nloc: 32,
///     tokens: 180,
///     params: 1,
///     start_line: 10,
///     end_line: 48,
/// };
/// assert!(f.cyclomatic >= 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionComplexity {
    /// Function name.
    pub name: String,
    /// Name with parameter list as reported by the analyzer.
    pub long_name: String,
    /// Cyclomatic complexity.
    pub cyclomatic: u32,
    /// Lines of code, blank and comment lines excluded.
    pub nloc: u32,
    /// Token count.
    pub tokens: u32,
    /// Number of parameters.
    pub params: u32,
    /// First line of the function.
    pub start_line: u32,
    /// Last line of the function.
    pub end_line: u32,
}

/// Per-function complexity for one file at one revision.
///
/// # Examples
///
/// ```
/// use strata_complexity::FileComplexity;
///
/// let fc = FileComplexity {
///     path: "src/git.rs".into(),
///     revision: "HEAD".into(),
///     functions: vec![],
///     total_nloc: 0,
///     total_tokens: 0,
/// };
/// assert!(fc.functions.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileComplexity {
    /// Path within the repository.
    pub path: String,
    /// Revision the content was taken from.
    pub revision: String,
    /// One record per function, in source order.
    pub functions: Vec<FunctionComplexity>,
    /// Sum of function NLOC.
    pub total_nloc: u64,
    /// Sum of function token counts.
    pub total_tokens: u64,
}

/// Options for complexity retrieval.
///
/// # Examples
///
/// ```
/// use strata_complexity::LizardOptions;
///
/// let opts = LizardOptions::default();
/// assert_eq!(opts.lizard_program, "lizard");
/// ```
#[derive(Debug, Clone)]
pub struct LizardOptions {
    /// Complexity analyzer executable (default: `"lizard"`).
    pub lizard_program: String,
}

impl Default for LizardOptions {
    fn default() -> Self {
        Self {
            lizard_program: "lizard".into(),
        }
    }
}

/// Analyze `path` at `revision` with lizard.
///
/// The content is fetched through `downloader` and written to a temporary
/// file that keeps the original extension, since the analyzer detects the
/// language from it.
///
/// # Errors
///
/// Returns [`StrataError::Tool`] when the SCM client or the analyzer
/// fails, and [`StrataError::Parse`] when the report is garbled.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use strata_complexity::{get_complexity, LizardOptions};
/// use strata_scm::GitDownloader;
///
/// let downloader = GitDownloader::new(Path::new("."), "git");
/// let report = get_complexity("src/main.rs", "HEAD", &downloader, &LizardOptions::default())
///     .unwrap();
/// for f in &report.functions {
///     println!("{} ccn={} nloc={}", f.name, f.cyclomatic, f.nloc);
/// }
/// ```
pub fn get_complexity(
    path: &str,
    revision: &str,
    downloader: &dyn Downloader,
    options: &LizardOptions,
) -> Result<FileComplexity> {
    let download = downloader.download(revision, path)?;

    let mut temp = tempfile::Builder::new()
        .prefix("strata-")
        .suffix(&format!(".{}", extension_of(path)))
        .tempfile()?;
    temp.write_all(download.content.as_bytes())?;
    temp.flush()?;

    let temp_path = temp.path().to_string_lossy().into_owned();
    let output = run_tool(&options.lizard_program, &["--csv", &temp_path], None)?;
    let functions = parse_lizard_csv(&output)?;

    let total_nloc = functions.iter().map(|f| u64::from(f.nloc)).sum();
    let total_tokens = functions.iter().map(|f| u64::from(f.tokens)).sum();

    Ok(FileComplexity {
        path: path.to_string(),
        revision: revision.to_string(),
        functions,
        total_nloc,
        total_tokens,
    })
}

/// Pick the extension the analyzer should see; files without one are
/// treated as plain text, which lizard reports as zero functions.
fn extension_of(path: &str) -> &str {
    std::path::Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("txt")
}

/// Parse `lizard --csv` output.
///
/// Columns: NLOC, CCN, tokens, params, length, location, file, name,
/// long name, start line, end line. Rows that do not fit (a header, a
/// stray diagnostic) are skipped with a warning.
pub(crate) fn parse_lizard_csv(output: &str) -> Result<Vec<FunctionComplexity>> {
    let mut functions = Vec::new();
    for line in output.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let fields = split_csv_record(line);
        if fields.len() < 11 {
            log::warn!("skipping short lizard row: {line}");
            continue;
        }
        let numeric = |index: usize| fields[index].parse::<u32>().ok();
        let (Some(nloc), Some(cyclomatic), Some(tokens), Some(params)) =
            (numeric(0), numeric(1), numeric(2), numeric(3))
        else {
            // header row or diagnostic
            log::warn!("skipping non-numeric lizard row: {line}");
            continue;
        };
        let (Some(start_line), Some(end_line)) = (numeric(9), numeric(10)) else {
            return Err(StrataError::Parse(format!(
                "bad line range in lizard row: {line}"
            )));
        };
        functions.push(FunctionComplexity {
            name: fields[7].clone(),
            long_name: fields[8].clone(),
            cyclomatic,
            nloc,
            tokens,
            params,
            start_line,
            end_line,
        });
    }
    Ok(functions)
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = "\
12,3,78,2,14,\"main@10-23@./src/main.rs\",\"./src/main.rs\",\"main\",\"main( argc , argv )\",10,23
4,1,20,0,5,\"helper@30-34@./src/main.rs\",\"./src/main.rs\",\"helper\",\"helper()\",30,34
";

    #[test]
    fn parses_function_rows() {
        let functions = parse_lizard_csv(REPORT).unwrap();
        assert_eq!(functions.len(), 2);

        let main = &functions[0];
        assert_eq!(main.name, "main");
        assert_eq!(main.long_name, "main( argc , argv )");
        assert_eq!(main.nloc, 12);
        assert_eq!(main.cyclomatic, 3);
        assert_eq!(main.tokens, 78);
        assert_eq!(main.params, 2);
        assert_eq!(main.start_line, 10);
        assert_eq!(main.end_line, 23);
    }

    #[test]
    fn header_row_is_skipped() {
        let report = format!("NLOC,CCN,token,PARAM,length,location,file,function,long_name,start,end\n{REPORT}");
        let functions = parse_lizard_csv(&report).unwrap();
        assert_eq!(functions.len(), 2);
    }

    #[test]
    fn function_names_with_commas_survive_quoting() {
        let report = "\
5,2,30,1,6,\"op<a, b>@1-6@f.cpp\",\"f.cpp\",\"op<a, b>\",\"op<a, b>( x )\",1,6
";
        let functions = parse_lizard_csv(report).unwrap();
        assert_eq!(functions[0].name, "op<a, b>");
    }

    #[test]
    fn empty_report_yields_no_functions() {
        assert!(parse_lizard_csv("").unwrap().is_empty());
    }

    #[test]
    fn extension_defaults_to_txt() {
        assert_eq!(extension_of("src/main.rs"), "rs");
        assert_eq!(extension_of("Makefile"), "txt");
    }

    #[test]
    fn rows_serialize_camel_case() {
        let functions = parse_lizard_csv(REPORT).unwrap();
        let json = serde_json::to_value(&functions[0]).unwrap();
        assert!(json.get("startLine").is_some());
        assert!(json.get("longName").is_some());
        assert!(json.get("start_line").is_none());
    }

    #[test]
    fn totals_sum_over_functions() {
        let functions = parse_lizard_csv(REPORT).unwrap();
        let total_nloc: u64 = functions.iter().map(|f| u64::from(f.nloc)).sum();
        let total_tokens: u64 = functions.iter().map(|f| u64::from(f.tokens)).sum();
        assert_eq!(total_nloc, 16);
        assert_eq!(total_tokens, 98);
    }
}
