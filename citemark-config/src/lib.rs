//! Shared configuration loader for the citemark toolchain.
//!
//! `defaults/citemark.default.toml` is embedded into every binary so that docs and
//! runtime behavior stay in sync. Applications layer user-specific files on top
//! of those defaults via [`Loader`] before deserializing into [`CitemarkConfig`].

use citemark_parser::{MarkerSyntax, SyntaxError};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

const DEFAULT_TOML: &str = include_str!("../defaults/citemark.default.toml");

/// Top-level configuration consumed by citemark applications.
#[derive(Debug, Clone, Deserialize)]
pub struct CitemarkConfig {
    pub markers: MarkersConfig,
    pub output: OutputConfig,
}

/// Marker vocabulary as written in TOML. Single-character fields are strings there.
#[derive(Debug, Clone, Deserialize)]
pub struct MarkersConfig {
    pub open: Vec<char>,
    pub close: Vec<char>,
    pub citation_labels: Vec<String>,
    pub label_separators: Vec<char>,
    pub page_labels: Vec<String>,
    #[serde(default)]
    pub reference_separators: Vec<char>,
    pub implementation_labels: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub pretty: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    Json,
    Tag,
    Numbered,
}

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to load configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("invalid marker syntax: {0}")]
    Syntax(#[from] SyntaxError),
}

impl CitemarkConfig {
    /// The validated marker vocabulary described by the `[markers]` section.
    pub fn marker_syntax(&self) -> Result<MarkerSyntax, SyntaxError> {
        let markers = &self.markers;
        let syntax = MarkerSyntax {
            open: markers.open.clone(),
            close: markers.close.clone(),
            citation_labels: markers.citation_labels.clone(),
            label_separators: markers.label_separators.clone(),
            page_labels: markers.page_labels.clone(),
            reference_separators: markers.reference_separators.clone(),
            implementation_labels: markers.implementation_labels.clone(),
        };
        syntax.validate()?;
        Ok(syntax)
    }
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (useful for CLI settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<CitemarkConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }

    /// Build and also validate the marker vocabulary.
    pub fn load(self) -> Result<(CitemarkConfig, MarkerSyntax), ConfigLoadError> {
        let config = self.build()?;
        let syntax = config.marker_syntax()?;
        Ok((config, syntax))
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<CitemarkConfig, ConfigError> {
    Loader::new().build()
}
