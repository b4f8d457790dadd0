// crates/docspec-config/tests/common/mod.rs
// ============================================================================
// Module: Config Test Helpers
// Description: Shared helpers for docspec-config integration tests.
// Purpose: Write temporary config files and check error messages.
// ============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use std::collections::BTreeMap;
use std::io::Write;

use docspec_config::ConfigError;
use docspec_config::DocspecConfig;
use tempfile::NamedTempFile;

/// Result type shared by config suites.
pub type TestResult = Result<(), String>;

/// Writes `contents` to a temporary `.toml` file.
pub fn config_file(contents: &str) -> Result<NamedTempFile, String> {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .map_err(|err| err.to_string())?;
    file.write_all(contents.as_bytes()).map_err(|err| err.to_string())?;
    Ok(file)
}

/// Builds an environment snapshot from pairs.
pub fn env_of(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs.iter().map(|(name, value)| ((*name).to_string(), (*value).to_string())).collect()
}

/// Loads `contents` through a temporary file with an empty environment.
pub fn load_toml(contents: &str) -> Result<Result<DocspecConfig, ConfigError>, String> {
    let file = config_file(contents)?;
    Ok(DocspecConfig::load(Some(file.path()), &BTreeMap::new()))
}

/// Checks that `result` failed with a message containing `needle`.
pub fn assert_invalid(result: Result<DocspecConfig, ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(_) => Err("expected invalid config load".to_string()),
    }
}
