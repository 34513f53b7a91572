//! configuration file
//!
//! ```yaml
//! partition:
//!   # kinds moved out of the primary stream
//!   kinds:
//!     - IAMPolicyMember
//! ```
//!
//! Every section and field is optional.
use indexmap::IndexSet;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub partition: PartitionConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PartitionConfig {
    /// kinds that go to the secondary group
    pub kinds: IndexSet<String>,
}

impl Default for PartitionConfig {
    fn default() -> Self {
        Self {
            kinds: IndexSet::from(["IAMPolicyMember".to_string()]),
        }
    }
}

impl PartitionConfig {
    pub fn matches(&self, kind: &str) -> bool {
        self.kinds.contains(kind)
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        tracing::info!(path=%path.display(), "loading config");
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        // an empty file is an empty config
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(contents)?)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("IO error")]
    IoError(#[from] std::io::Error),
    #[error("Invalid config file")]
    Invalid(#[from] serde_yaml::Error),
}
