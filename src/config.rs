use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Config file looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "hookshelf.toml";

/// Content build configuration.
///
/// Loaded from built-in defaults, then an optional TOML file, then
/// `HOOKSHELF_`-prefixed environment variables (`__` separates nested keys,
/// e.g. `HOOKSHELF_OUTPUT__CLEAN=false`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Directory every source path is resolved against.
    pub root: PathBuf,
    /// Abort the whole build when any document fails.
    pub strict: bool,
    pub output: OutputConfig,
    pub collections: CollectionsConfig,
    pub markdown: MarkdownConfig,
}

/// Where compiled data and extracted assets go.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory for the compiled collection files.
    pub data: PathBuf,
    /// Directory for assets copied out of document bodies.
    pub assets: PathBuf,
    /// Public path assets are served under.
    pub base: String,
    /// Asset file name template (`[name]`, `[hash]`, `[hash:N]`, `[ext]`).
    pub name: String,
    /// Remove previous output before writing.
    pub clean: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionsConfig {
    pub hooks: CollectionConfig,
}

/// A named group of documents matched by a glob pattern under `root`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionConfig {
    pub name: String,
    pub pattern: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkdownConfig {
    /// Syntax highlighting theme name.
    pub theme: String,
    /// Optional folder of extra `.tmTheme` files.
    pub themes_dir: Option<PathBuf>,
    pub autolink: AutolinkConfig,
}

/// Attributes of the self-link wrapped around every heading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutolinkConfig {
    pub class: String,
    pub aria_label: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("src/content"),
            strict: false,
            output: OutputConfig::default(),
            collections: CollectionsConfig::default(),
            markdown: MarkdownConfig::default(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            data: PathBuf::from(".hookshelf"),
            assets: PathBuf::from("public/static"),
            base: "/static/".to_string(),
            name: "[name]-[hash:6].[ext]".to_string(),
            clean: true,
        }
    }
}

impl Default for CollectionsConfig {
    fn default() -> Self {
        Self {
            hooks: CollectionConfig {
                name: "Hooks".to_string(),
                pattern: "docs/**/*.mdx".to_string(),
            },
        }
    }
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            theme: "github-dark".to_string(),
            themes_dir: None,
            autolink: AutolinkConfig::default(),
        }
    }
}

impl Default for AutolinkConfig {
    fn default() -> Self {
        Self {
            class: "subheading-anchor".to_string(),
            aria_label: "Link to section".to_string(),
        }
    }
}

impl SiteConfig {
    /// Load the configuration.
    ///
    /// An explicit `path` must exist; otherwise `hookshelf.toml` in the
    /// working directory is used when present.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let defaults = Config::try_from(&SiteConfig::default())
            .map_err(|e| AppError::Config(format!("defaults: {e}")))?;

        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let config: SiteConfig = Config::builder()
            .add_source(defaults)
            .add_source(file)
            .add_source(
                Environment::with_prefix("HOOKSHELF")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| AppError::Config(e.to_string()))?;

        config.validate()?;
        tracing::debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }

    /// Resolve relative paths against `base` (usually the config file's
    /// directory).
    pub fn with_base_dir(mut self, base: &Path) -> Self {
        let themes_dir = self.markdown.themes_dir.as_mut();
        for path in [&mut self.root, &mut self.output.data, &mut self.output.assets]
            .into_iter()
            .chain(themes_dir)
        {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
        self
    }

    /// Reject configurations the build cannot run with.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.root.as_os_str().is_empty() {
            return Err(AppError::Config("root cannot be empty".into()));
        }
        if self.collections.hooks.pattern.trim().is_empty() {
            return Err(AppError::Config("collection pattern cannot be empty".into()));
        }
        glob::Pattern::new(&self.collections.hooks.pattern).map_err(|e| {
            AppError::Config(format!(
                "Invalid collection pattern '{}': {e}",
                self.collections.hooks.pattern
            ))
        })?;
        if !self.output.name.contains("[name]") && !self.output.name.contains("[hash") {
            return Err(AppError::Config(format!(
                "Asset name template '{}' must contain [name] or [hash]",
                self.output.name
            )));
        }
        if !self.output.base.ends_with('/') {
            return Err(AppError::Config(format!(
                "Asset base '{}' must end with '/'",
                self.output.base
            )));
        }
        Ok(())
    }
}
