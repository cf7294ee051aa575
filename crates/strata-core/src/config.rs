use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::StrataError;

/// Top-level configuration loaded from `.strata.toml`.
///
/// Supports layered resolution: CLI flags > local config > defaults.
///
/// # Examples
///
/// ```
/// use strata_core::StrataConfig;
///
/// let config = StrataConfig::default();
/// assert_eq!(config.scm.git_program, "git");
/// assert_eq!(config.scm.since_days, 365);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StrataConfig {
    /// Source-control access settings.
    #[serde(default)]
    pub scm: ScmConfig,
    /// Line-count tool settings.
    #[serde(default)]
    pub loc: LocConfig,
    /// Complexity analyzer settings.
    #[serde(default)]
    pub complexity: ComplexityConfig,
    /// Report shaping settings.
    #[serde(default)]
    pub report: ReportConfig,
}

impl StrataConfig {
    /// Load configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`StrataError::Io`] if the file cannot be read, or
    /// [`StrataError::Toml`] if the content is not valid TOML.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use strata_core::StrataConfig;
    /// use std::path::Path;
    ///
    /// let config = StrataConfig::from_file(Path::new(".strata.toml")).unwrap();
    /// ```
    pub fn from_file(path: &Path) -> Result<Self, StrataError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`StrataError::Toml`] if parsing fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use strata_core::StrataConfig;
    ///
    /// let toml = r#"
    /// [scm]
    /// since_days = 90
    /// "#;
    /// let config = StrataConfig::from_toml(toml).unwrap();
    /// assert_eq!(config.scm.since_days, 90);
    /// ```
    pub fn from_toml(content: &str) -> Result<Self, StrataError> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }
}

/// Source-control access configuration.
///
/// # Examples
///
/// ```
/// use strata_core::ScmConfig;
///
/// let config = ScmConfig::default();
/// assert_eq!(config.git_program, "git");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScmConfig {
    /// Git client executable (default: `"git"`).
    #[serde(default = "default_git_program")]
    pub git_program: String,
    /// How far back to mine the log when `--after` is not given (default: 365).
    #[serde(default = "default_since_days")]
    pub since_days: u64,
}

fn default_git_program() -> String {
    "git".into()
}

fn default_since_days() -> u64 {
    365
}

impl Default for ScmConfig {
    fn default() -> Self {
        Self {
            git_program: default_git_program(),
            since_days: default_since_days(),
        }
    }
}

/// Line-count tool configuration.
///
/// # Examples
///
/// ```
/// use strata_core::LocConfig;
///
/// let config = LocConfig::default();
/// assert_eq!(config.cloc_program, "cloc");
/// assert!(config.cache);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocConfig {
    /// Line-counter executable (default: `"cloc"`).
    #[serde(default = "default_cloc_program")]
    pub cloc_program: String,
    /// Cache parsed reports on disk (default: true).
    #[serde(default = "default_cache")]
    pub cache: bool,
    /// Directory holding cached reports (default: `".strata"`).
    #[serde(default = "default_cache_dir")]
    pub cache_dir: String,
}

fn default_cloc_program() -> String {
    "cloc".into()
}

fn default_cache() -> bool {
    true
}

fn default_cache_dir() -> String {
    ".strata".into()
}

impl Default for LocConfig {
    fn default() -> Self {
        Self {
            cloc_program: default_cloc_program(),
            cache: default_cache(),
            cache_dir: default_cache_dir(),
        }
    }
}

/// Complexity analyzer configuration.
///
/// # Examples
///
/// ```
/// use strata_core::ComplexityConfig;
///
/// let config = ComplexityConfig::default();
/// assert_eq!(config.lizard_program, "lizard");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplexityConfig {
    /// Complexity analyzer executable (default: `"lizard"`).
    #[serde(default = "default_lizard_program")]
    pub lizard_program: String,
}

fn default_lizard_program() -> String {
    "lizard".into()
}

impl Default for ComplexityConfig {
    fn default() -> Self {
        Self {
            lizard_program: default_lizard_program(),
        }
    }
}

/// Report shaping configuration.
///
/// # Examples
///
/// ```
/// use strata_core::ReportConfig;
///
/// let config = ReportConfig::default();
/// assert_eq!(config.limit, 20);
/// assert_eq!(config.mass_change_threshold, 10);
/// assert_eq!(config.component_depth, 2);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Maximum rows to display per report (default: 20).
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Revisions touching more paths than this are mass changes (default: 10).
    #[serde(default = "default_mass_change_threshold")]
    pub mass_change_threshold: u64,
    /// Leading directory segments forming a component label (default: 2).
    #[serde(default = "default_component_depth")]
    pub component_depth: usize,
    /// Hide co-change pairs below this coupling ratio (default: 0.0).
    #[serde(default)]
    pub min_coupling: f64,
}

fn default_limit() -> usize {
    20
}

fn default_mass_change_threshold() -> u64 {
    10
}

fn default_component_depth() -> usize {
    2
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            mass_change_threshold: default_mass_change_threshold(),
            component_depth: default_component_depth(),
            min_coupling: 0.0,
        }
    }
}
