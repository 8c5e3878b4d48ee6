//! Policy knobs for the engine and analyzers.
//!
//! Loaded from `.stackcraft/config.toml` under the project root. A missing file
//! means defaults; a present but invalid file is an error.

use crate::core::error::StackError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const CONFIG_DIR: &str = ".stackcraft";
pub const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Policy {
    /// Agents scoring below this confidence are dropped.
    pub inclusion_threshold: u8,
    /// Characters per token for cost estimates.
    pub chars_per_token: usize,
    /// Shared triggers over the smaller set size; pairs above this overlap.
    pub overlap_threshold: f64,
    /// Descriptions shorter than this are vague.
    pub vague_min_chars: usize,
    /// Bodies with fewer non-whitespace characters are empty.
    pub empty_min_chars: usize,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            inclusion_threshold: 40,
            chars_per_token: 4,
            overlap_threshold: 0.5,
            vague_min_chars: 30,
            empty_min_chars: 10,
        }
    }
}

impl Policy {
    pub fn check(&self) -> Result<(), StackError> {
        if self.inclusion_threshold > 100 {
            return Err(StackError::ConfigError(format!(
                "inclusion_threshold must be within 0..=100, got {}",
                self.inclusion_threshold
            )));
        }
        if self.chars_per_token == 0 {
            return Err(StackError::ConfigError(
                "chars_per_token must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.overlap_threshold) {
            return Err(StackError::ConfigError(format!(
                "overlap_threshold must be within 0.0..=1.0, got {}",
                self.overlap_threshold
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    policy: Policy,
}

/// Load policy from `<project_root>/.stackcraft/config.toml`.
pub fn load_policy(project_root: &Path) -> Result<Policy, StackError> {
    let config_path = project_root.join(CONFIG_DIR).join(CONFIG_FILE);
    if !config_path.is_file() {
        return Ok(Policy::default());
    }
    let content = fs::read_to_string(&config_path).map_err(StackError::IoError)?;
    let file: ConfigFile = toml::from_str(&content)
        .map_err(|e| StackError::ConfigError(format!("{}: {}", config_path.display(), e)))?;
    file.policy.check()?;
    Ok(file.policy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_config_yields_defaults() {
        let tmp = tempdir().unwrap();
        assert_eq!(load_policy(tmp.path()).unwrap(), Policy::default());
    }

    #[test]
    fn partial_config_overrides_only_given_keys() {
        let tmp = tempdir().unwrap();
        fs::create_dir_all(tmp.path().join(CONFIG_DIR)).unwrap();
        fs::write(
            tmp.path().join(CONFIG_DIR).join(CONFIG_FILE),
            "[policy]\noverlap_threshold = 0.75\nvague_min_chars = 20\n",
        )
        .unwrap();
        let policy = load_policy(tmp.path()).unwrap();
        assert_eq!(policy.overlap_threshold, 0.75);
        assert_eq!(policy.vague_min_chars, 20);
        assert_eq!(policy.inclusion_threshold, 40);
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let tmp = tempdir().unwrap();
        fs::create_dir_all(tmp.path().join(CONFIG_DIR)).unwrap();
        fs::write(
            tmp.path().join(CONFIG_DIR).join(CONFIG_FILE),
            "[policy]\nchars_per_token = 0\n",
        )
        .unwrap();
        assert!(matches!(
            load_policy(tmp.path()),
            Err(StackError::ConfigError(_))
        ));
    }
}
