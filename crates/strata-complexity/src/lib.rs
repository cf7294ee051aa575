//! Function-level complexity via the lizard analyzer.
//!
//! Fetches file content at a revision through the SCM downloader seam,
//! materializes it in a temporary file, and runs `lizard --csv` over it
//! to obtain per-function cyclomatic complexity and token counts.

pub mod lizard;

pub use lizard::{get_complexity, FileComplexity, FunctionComplexity, LizardOptions};
