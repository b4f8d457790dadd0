// crates/docspec-config/src/config.rs
// ============================================================================
// Module: Docspec Configuration
// Description: Configuration loading, environment overrides, and validation.
// Purpose: Provide strict config parsing with hard limits for docspec runs.
// Dependencies: docspec-assert, docspec-core, serde, thiserror, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! A missing `docspec.toml` in the working directory is not an error, but a
//! file named explicitly (argument or `DOCSPEC_CONFIG`) must exist. Values
//! resolve in this order: file, then environment, then CLI flags.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use docspec_assert::HealthMode;
use docspec_core::CaseFormat;
use docspec_core::DiscoveryOptions;
use docspec_core::EnvAllowlist;
use docspec_core::FileLogSink;
use docspec_core::NoopLogSink;
use docspec_core::NormalizeOptions;
use docspec_core::RunLogSink;
use docspec_core::RunSettings;
use docspec_core::StderrLogSink;
use docspec_core::discovery::DEFAULT_CASE_PATTERN;
use docspec_core::runner::DEFAULT_MAX_FIXTURE_BYTES;
use docspec_core::runner::DEFAULT_PROCESS_TIMEOUT_MS;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "docspec.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "DOCSPEC_CONFIG";
/// Environment variable overriding `runner.assert_health`.
pub const ASSERT_HEALTH_ENV_VAR: &str = "DOCSPEC_ASSERT_HEALTH";
/// Environment variable overriding `runner.entrypoint`.
pub const ENTRYPOINT_ENV_VAR: &str = "DOCSPEC_ENTRYPOINT";
/// Environment variable overriding `runner.env_allowlist`.
pub const ENV_ALLOWLIST_ENV_VAR: &str = "DOCSPEC_ENV_ALLOWLIST";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Minimum child process timeout in milliseconds.
pub(crate) const MIN_PROCESS_TIMEOUT_MS: u64 = 1;
/// Maximum child process timeout in milliseconds.
pub(crate) const MAX_PROCESS_TIMEOUT_MS: u64 = 3_600_000;
/// Upper bound for `runner.max_fixture_bytes`.
pub(crate) const MAX_FIXTURE_BYTES_LIMIT: usize = 64 * 1024 * 1024;
/// Maximum length of a configured entrypoint.
pub(crate) const MAX_ENTRYPOINT_LENGTH: usize = 4096;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Docspec configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DocspecConfig {
    /// Run-level defaults.
    #[serde(default)]
    pub runner: RunnerConfig,
    /// Case discovery and normalization.
    #[serde(default)]
    pub cases: CasesConfig,
    /// Run event logging.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl DocspecConfig {
    /// Loads configuration, applies environment overrides, and validates.
    ///
    /// `env` is a snapshot of the process environment; only `DOCSPEC_*`
    /// keys are consulted.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read or parsed, or
    /// when the merged configuration is invalid.
    pub fn load(path: Option<&Path>, env: &BTreeMap<String, String>) -> Result<Self, ConfigError> {
        let (resolved, explicit) = resolve_path(path, env)?;
        validate_path(&resolved)?;
        let mut config = if !explicit && !resolved.exists() {
            Self::default()
        } else {
            Self::from_file(&resolved)?
        };
        config.apply_env(env)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a configuration file without validating it.
    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let bytes = fs::read(path).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Applies `DOCSPEC_*` overrides from an environment snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when `DOCSPEC_ASSERT_HEALTH` names an
    /// unknown mode.
    pub fn apply_env(&mut self, env: &BTreeMap<String, String>) -> Result<(), ConfigError> {
        if let Some(mode) = env.get(ASSERT_HEALTH_ENV_VAR).map(|value| value.trim())
            && !mode.is_empty()
        {
            self.runner.assert_health = mode
                .parse()
                .map_err(|err| ConfigError::Invalid(format!("{ASSERT_HEALTH_ENV_VAR}: {err}")))?;
        }
        if let Some(entrypoint) = env.get(ENTRYPOINT_ENV_VAR)
            && !entrypoint.trim().is_empty()
        {
            self.runner.entrypoint = Some(entrypoint.clone());
        }
        if let Some(allowlist) = env.get(ENV_ALLOWLIST_ENV_VAR) {
            self.runner.env_allowlist = Some(allowlist.clone());
        }
        Ok(())
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.runner.validate()?;
        self.cases.validate()?;
        self.logging.validate()
    }

    /// Converts the configuration into engine run settings.
    #[must_use]
    pub fn run_settings(&self) -> RunSettings {
        RunSettings {
            assert_health: self.runner.assert_health,
            default_entrypoint: self
                .runner
                .entrypoint
                .as_ref()
                .filter(|entrypoint| !entrypoint.trim().is_empty())
                .cloned(),
            env_allowlist: EnvAllowlist::parse(self.runner.env_allowlist.as_deref()),
            process_timeout: Duration::from_millis(self.runner.process_timeout_ms),
            max_fixture_bytes: self.runner.max_fixture_bytes,
            normalize: NormalizeOptions {
                kind_alias: self.cases.kind_alias,
            },
        }
    }

    /// Returns the discovery options for `--cases` resolution.
    #[must_use]
    pub fn discovery_options(&self) -> DiscoveryOptions {
        DiscoveryOptions {
            pattern: self.cases.pattern.clone(),
            formats: self.cases.formats.clone(),
        }
    }
}

/// Run-level defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunnerConfig {
    /// Assert-health mode for cases without their own.
    #[serde(default)]
    pub assert_health: HealthMode,
    /// Default `cli.run` entrypoint.
    #[serde(default)]
    pub entrypoint: Option<String>,
    /// Comma-separated child environment allow-list.
    #[serde(default)]
    pub env_allowlist: Option<String>,
    /// Bound on each child process in milliseconds.
    #[serde(default = "default_process_timeout_ms")]
    pub process_timeout_ms: u64,
    /// Maximum fixture document size in bytes.
    #[serde(default = "default_max_fixture_bytes")]
    pub max_fixture_bytes: usize,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            assert_health: HealthMode::default(),
            entrypoint: None,
            env_allowlist: None,
            process_timeout_ms: default_process_timeout_ms(),
            max_fixture_bytes: default_max_fixture_bytes(),
        }
    }
}

impl RunnerConfig {
    /// Validates runner configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_PROCESS_TIMEOUT_MS..=MAX_PROCESS_TIMEOUT_MS).contains(&self.process_timeout_ms) {
            return Err(ConfigError::Invalid(format!(
                "runner.process_timeout_ms must be between {MIN_PROCESS_TIMEOUT_MS} and \
                 {MAX_PROCESS_TIMEOUT_MS}"
            )));
        }
        if self.max_fixture_bytes == 0 || self.max_fixture_bytes > MAX_FIXTURE_BYTES_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "runner.max_fixture_bytes must be between 1 and {MAX_FIXTURE_BYTES_LIMIT}"
            )));
        }
        if let Some(entrypoint) = &self.entrypoint
            && entrypoint.len() > MAX_ENTRYPOINT_LENGTH
        {
            return Err(ConfigError::Invalid("runner.entrypoint exceeds max length".to_string()));
        }
        Ok(())
    }
}

/// Case discovery and normalization.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CasesConfig {
    /// File-name glob for Markdown fixtures.
    #[serde(default = "default_case_pattern")]
    pub pattern: String,
    /// Enabled fixture formats.
    #[serde(default = "default_case_formats")]
    pub formats: Vec<CaseFormat>,
    /// Whether `kind` aliases a missing `type`.
    #[serde(default = "default_kind_alias")]
    pub kind_alias: bool,
}

impl Default for CasesConfig {
    fn default() -> Self {
        Self {
            pattern: default_case_pattern(),
            formats: default_case_formats(),
            kind_alias: default_kind_alias(),
        }
    }
}

impl CasesConfig {
    /// Validates case configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.pattern.trim().is_empty() {
            return Err(ConfigError::Invalid("cases.pattern must be non-empty".to_string()));
        }
        if self.formats.is_empty() {
            return Err(ConfigError::Invalid("cases.formats must be non-empty".to_string()));
        }
        Ok(())
    }
}

/// Run event sink selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogSinkKind {
    /// Drop events.
    #[default]
    None,
    /// JSON lines on stderr.
    Stderr,
    /// JSON lines appended to `logging.path`.
    File,
}

impl FromStr for LogSinkKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "stderr" => Ok(Self::Stderr),
            "file" => Ok(Self::File),
            _ => Err("log sink must be one of: none, stderr, file".to_string()),
        }
    }
}

/// Run event logging.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Sink kind.
    #[serde(default)]
    pub sink: LogSinkKind,
    /// Log file path for the `file` sink.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl LoggingConfig {
    /// Validates logging configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        match (self.sink, &self.path) {
            (LogSinkKind::File, None) => {
                Err(ConfigError::Invalid("logging.path is required for file sink".to_string()))
            }
            (_, Some(path)) => validate_path_string("logging.path", &path.to_string_lossy()),
            (_, None) => Ok(()),
        }
    }

    /// Opens the configured sink.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the log file cannot be opened, and
    /// [`ConfigError::Invalid`] when the file sink has no path.
    pub fn open_sink(&self) -> Result<Arc<dyn RunLogSink>, ConfigError> {
        match self.sink {
            LogSinkKind::None => Ok(Arc::new(NoopLogSink)),
            LogSinkKind::Stderr => Ok(Arc::new(StderrLogSink)),
            LogSinkKind::File => {
                let path = self.path.as_deref().ok_or_else(|| {
                    ConfigError::Invalid("logging.path is required for file sink".to_string())
                })?;
                let sink = FileLogSink::new(path).map_err(|err| {
                    ConfigError::Io(format!("cannot open {}: {err}", path.display()))
                })?;
                Ok(Arc::new(sink))
            }
        }
    }
}

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default child timeout.
const fn default_process_timeout_ms() -> u64 {
    DEFAULT_PROCESS_TIMEOUT_MS
}

/// Default fixture size limit.
const fn default_max_fixture_bytes() -> usize {
    DEFAULT_MAX_FIXTURE_BYTES
}

/// Default Markdown glob.
fn default_case_pattern() -> String {
    DEFAULT_CASE_PATTERN.to_string()
}

/// Default format list.
fn default_case_formats() -> Vec<CaseFormat> {
    vec![CaseFormat::Markdown]
}

/// Default kind-alias profile.
const fn default_kind_alias() -> bool {
    true
}

// ============================================================================
// SECTION: Path Validation
// ============================================================================

/// Resolves the config path; the flag reports whether it was named explicitly.
fn resolve_path(
    path: Option<&Path>,
    env: &BTreeMap<String, String>,
) -> Result<(PathBuf, bool), ConfigError> {
    if let Some(path) = path {
        return Ok((path.to_path_buf(), true));
    }
    if let Some(env_path) = env.get(CONFIG_ENV_VAR).filter(|value| !value.trim().is_empty()) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok((PathBuf::from(env_path), true));
    }
    Ok((PathBuf::from(DEFAULT_CONFIG_NAME), false))
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a configured path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    if Path::new(trimmed)
        .components()
        .any(|component| component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH)
    {
        return Err(ConfigError::Invalid(format!("{field} path component too long")));
    }
    Ok(())
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}
