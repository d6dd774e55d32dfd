//! Configuration loader
//!
//! `defaults/pointlabel.default.toml` is embedded into the binary so the
//! documented defaults and the runtime ones cannot drift. On top of it the
//! CLI layers, in order: an optional `pointlabel.toml` or the `--config`
//! file, `POINTLABEL_*` environment variables, then flag overrides.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File, FileFormat, ValueKind};
use serde::Deserialize;

use crate::grammar::UiVariant;
use crate::tokenizer::RetryPolicy;

const DEFAULT_TOML: &str = include_str!("../defaults/pointlabel.default.toml");
const ENV_PREFIX: &str = "POINTLABEL";

#[derive(Debug, Clone, Deserialize)]
pub struct PointlabelConfig {
    pub tokenizer: TokenizerConfig,
    pub storage: StorageConfig,
    pub import: ImportConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenizerConfig {
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
}

impl TokenizerConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            backoff: Duration::from_millis(self.retry_backoff_ms),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub directory: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImportConfig {
    pub child_variant: String,
}

impl ImportConfig {
    pub fn child_variant(&self) -> UiVariant {
        UiVariant::new(self.child_variant.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

/// Layers user settings over the built-in defaults.
///
/// Sources apply in the order they are added; later ones win key by key.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Seed the builder with `defaults/pointlabel.default.toml`.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a TOML file named with `--config`. A missing file is an error
    /// at [`Loader::build`] time.
    pub fn with_file(self, path: impl AsRef<Path>) -> Self {
        self.with_toml(path.as_ref(), true)
    }

    /// Layer a TOML file that may not exist, such as `pointlabel.toml` in
    /// the working directory.
    pub fn with_optional_file(self, path: impl AsRef<Path>) -> Self {
        self.with_toml(path.as_ref(), false)
    }

    fn with_toml(mut self, path: &Path, required: bool) -> Self {
        let source = File::from(path).format(FileFormat::Toml).required(required);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer `POINTLABEL_<SECTION>__<KEY>` variables from the process
    /// environment, e.g. `POINTLABEL_TOKENIZER__MAX_RETRIES=5`.
    pub fn with_environment(self) -> Self {
        self.with_variables(None)
    }

    /// Same as [`Loader::with_environment`], reading `variables` instead of
    /// the process environment when given.
    fn with_variables(mut self, variables: Option<HashMap<String, String>>) -> Self {
        let source = Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
            .source(variables);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Set one dotted key, e.g. `storage.directory` from `--store`.
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Merge every layer and deserialize the result.
    pub fn build(self) -> Result<PointlabelConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

pub fn load_defaults() -> Result<PointlabelConfig, ConfigError> {
    Loader::new().build()
}
