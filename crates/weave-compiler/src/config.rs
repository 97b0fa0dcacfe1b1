//! Project configuration (`weave.toml`)

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use weave_checker::ProbeConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// `[compiler]` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Namespace of generated functions; reserved
    pub namespace: String,
    /// Path segment between a function and its generated children
    pub marker: String,
    pub id_length: usize,
    /// Scoreboard objective holding reference flags
    pub objective: String,
    /// Fixed id seed for reproducible output
    pub seed: Option<u64>,
    /// Deepest nesting of jumps and host calls while generating
    pub max_call_levels: usize,
    pub probe: ProbeConfig,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            namespace: "weave".to_string(),
            marker: "gen".to_string(),
            id_length: 8,
            objective: weave_codegen::DEFAULT_OBJECTIVE.to_string(),
            seed: None,
            max_call_levels: weave_runtime::DEFAULT_MAX_CALL_LEVELS,
            probe: ProbeConfig::default(),
        }
    }
}

impl CompilerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let resource = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | '-' | '.');
        if self.namespace.is_empty() || !self.namespace.chars().all(resource) {
            return Err(ConfigError::Invalid(format!(
                "namespace '{}' is not a valid resource namespace",
                self.namespace
            )));
        }
        if self.marker.is_empty() || !self.marker.chars().all(resource) {
            return Err(ConfigError::Invalid(format!("marker '{}' is not a valid path segment", self.marker)));
        }
        if self.id_length == 0 {
            return Err(ConfigError::Invalid("id_length must be at least 1".to_string()));
        }
        if self.max_call_levels == 0 {
            return Err(ConfigError::Invalid("max_call_levels must be at least 1".to_string()));
        }
        if self.objective.is_empty() || self.objective.contains(char::is_whitespace) {
            return Err(ConfigError::Invalid(format!("objective '{}' is not valid", self.objective)));
        }
        Ok(())
    }
}

/// `[output]` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Datapack data directory written by `build`
    pub path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("out"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub compiler: CompilerConfig,
    pub output: OutputConfig,
}

impl ProjectConfig {
    pub const FILE_NAME: &'static str = "weave.toml";

    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.compiler.validate()?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        config.rebase(base);
        Ok(config)
    }

    /// `weave.toml` under `root`, or defaults relative to `root`
    pub fn discover(root: &Path) -> Result<Self, ConfigError> {
        let path = root.join(Self::FILE_NAME);
        if path.is_file() {
            log::debug!("loading {}", path.display());
            Self::load(&path)
        } else {
            let mut config = Self::default();
            config.rebase(root);
            Ok(config)
        }
    }

    fn rebase(&mut self, base: &Path) {
        if self.output.path.is_relative() {
            self.output.path = base.join(&self.output.path);
        }
    }
}
