//! Core types, configuration, and error handling for the strata toolkit.
//!
//! This crate provides the shared foundation used by all other strata crates:
//! - [`StrataError`] — unified error type using `thiserror`
//! - [`StrataConfig`] — configuration loaded from `.strata.toml`
//! - [`OutputFormat`] — output selection shared by every subcommand
//! - [`split_csv_record`] — quote-aware CSV field splitting for external
//!   tool reports

mod config;
mod csv;
mod error;
mod types;

pub use config::{
    ComplexityConfig, LocConfig, ReportConfig, ScmConfig, StrataConfig,
};
pub use csv::split_csv_record;
pub use error::StrataError;
pub use types::OutputFormat;

/// A convenience `Result` type for strata operations.
pub type Result<T> = std::result::Result<T, StrataError>;
