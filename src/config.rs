//! Configuration for block parsing and rendering

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading a configuration file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// How `<!--begin:NAME-->` markers are paired with `<!--end:NAME-->` markers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// A region runs from the first `begin:NAME` to the last `end:NAME` of the
    /// same name anywhere after it. Same-named siblings collapse into one region.
    #[default]
    Greedy,
    /// Markers are paired by depth, so same-named siblings and same-named
    /// nested regions stay independent.
    Nested,
}

/// What happens to a `{name}` placeholder that has no bound variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnboundVariables {
    /// Leave the placeholder in the output as literal text
    #[default]
    Keep,
    /// Remove identifier-like placeholders from the output
    Blank,
}

/// Configuration options for building and rendering a block tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateConfig {
    /// Collapse blank lines left behind by removed placeholders
    pub collapse_blank_lines: bool,

    /// Block marker pairing strategy
    pub match_mode: MatchMode,

    /// Treatment of placeholders without a binding
    pub unbound_variables: UnboundVariables,

    /// Texts longer than this many bytes are reported as large inputs
    pub large_input_threshold: usize,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            collapse_blank_lines: true,
            match_mode: MatchMode::Greedy,
            unbound_variables: UnboundVariables::Keep,
            large_input_threshold: 7000,
        }
    }
}

/// TOML structure for deserializing configuration files
#[derive(Deserialize)]
struct TomlConfig {
    template: Option<TomlTemplateSection>,
}

#[derive(Deserialize)]
struct TomlTemplateSection {
    collapse_blank_lines: Option<bool>,
    match_mode: Option<MatchMode>,
    unbound_variables: Option<UnboundVariables>,
    large_input_threshold: Option<usize>,
}

impl TemplateConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load configuration from a TOML string
    ///
    /// Keys missing from the `[template]` table keep their defaults.
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let parsed: TomlConfig = toml::from_str(content)?;
        let mut config = Self::default();

        if let Some(section) = parsed.template {
            if let Some(collapse) = section.collapse_blank_lines {
                config.collapse_blank_lines = collapse;
            }
            if let Some(mode) = section.match_mode {
                config.match_mode = mode;
            }
            if let Some(unbound) = section.unbound_variables {
                config.unbound_variables = unbound;
            }
            if let Some(threshold) = section.large_input_threshold {
                config.large_input_threshold = threshold;
            }
        }

        Ok(config)
    }

    /// Set whether blank lines are collapsed in rendered output
    pub fn with_collapse_blank_lines(mut self, collapse: bool) -> Self {
        self.collapse_blank_lines = collapse;
        self
    }

    /// Set the block marker pairing strategy
    pub fn with_match_mode(mut self, mode: MatchMode) -> Self {
        self.match_mode = mode;
        self
    }

    /// Set the treatment of unbound placeholders
    pub fn with_unbound_variables(mut self, unbound: UnboundVariables) -> Self {
        self.unbound_variables = unbound;
        self
    }

    /// Set the large-input threshold in bytes
    pub fn with_large_input_threshold(mut self, threshold: usize) -> Self {
        self.large_input_threshold = threshold;
        self
    }
}
