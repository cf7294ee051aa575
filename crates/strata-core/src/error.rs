use std::path::PathBuf;

/// Errors that can occur across the strata toolkit.
///
/// Each variant wraps a specific error domain. Library crates use this type
/// directly; the binary crate converts to `miette` diagnostics at the boundary.
///
/// # Examples
///
/// ```
/// use strata_core::StrataError;
///
/// let err = StrataError::Config("missing git program".into());
/// assert!(err.to_string().contains("missing git program"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum StrataError {
    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// An external tool could not be started or exited with a failure.
    #[error("{program} failed ({status}): {stderr}")]
    Tool {
        /// Program name as invoked.
        program: String,
        /// Exit status, or a short phrase when the tool never started.
        status: String,
        /// Captured standard error, trimmed.
        stderr: String,
    },

    /// External tool output that could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),

    /// JSON serialization / deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML deserialization failure.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A required file was not found.
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: StrataError = io_err.into();
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn config_error_displays_message() {
        let err = StrataError::Config("bad value".into());
        assert_eq!(err.to_string(), "configuration error: bad value");
    }

    #[test]
    fn tool_error_carries_program_and_stderr() {
        let err = StrataError::Tool {
            program: "cloc".into(),
            status: "exit status: 2".into(),
            stderr: "no such directory".into(),
        };
        let text = err.to_string();
        assert!(text.contains("cloc"));
        assert!(text.contains("no such directory"));
    }

    #[test]
    fn file_not_found_shows_path() {
        let err = StrataError::FileNotFound(PathBuf::from("/tmp/missing.rs"));
        assert!(err.to_string().contains("/tmp/missing.rs"));
    }
}
