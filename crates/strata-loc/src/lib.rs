//! Line-count retrieval via the cloc executable.
//!
//! Runs `cloc --csv --by-file` over a directory, parses the CSV report
//! into per-file records, and memoizes parsed results on disk so that
//! repeated expensive runs are avoided. Also provides gitignore-aware
//! file listing for reports that start from the working tree rather
//! than the log.

pub mod cache;
pub mod cloc;
pub mod files;

pub use cache::LocCache;
pub use cloc::{get_cloc, ClocOptions, LocRecord};
pub use files::list_files;
