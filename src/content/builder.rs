use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use glob::{MatchOptions, Pattern};
use walkdir::WalkDir;

use crate::config::SiteConfig;
use crate::content::assets::{extract_assets, AssetOptions, ExtractedAsset};
use crate::content::frontmatter::split_front_matter;
use crate::content::highlight::{resolve_theme, theme_css};
use crate::content::schema::{hook_schema, validate_hook, Schema, SchemaInput};
use crate::content::slug::path_slug;
use crate::content::transform::{parse, MarkdownPipeline};
use crate::error::AppError;
use crate::models::hook::Hook;

/// File stem of the compiled hooks collection inside the data directory.
pub const HOOKS_COLLECTION_KEY: &str = "hooks";

/// A document that was excluded from the build.
#[derive(Debug)]
pub struct DocumentFailure {
    /// Path relative to the content root.
    pub document: String,
    pub error: AppError,
}

/// Outcome of a build or check pass.
#[derive(Debug, Default)]
pub struct BuildReport {
    /// Compiled records, sorted by slug.
    pub hooks: Vec<Hook>,
    pub failures: Vec<DocumentFailure>,
    /// Number of distinct asset files referenced.
    pub assets: usize,
    /// Collection file written, if any.
    pub output: Option<PathBuf>,
}

impl BuildReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

struct Compiled {
    hooks: Vec<Hook>,
    assets: Vec<ExtractedAsset>,
    failures: Vec<DocumentFailure>,
}

/// Compiles the configured collection into content records.
pub struct ContentBuilder {
    config: SiteConfig,
    schema: Schema,
    pipeline: MarkdownPipeline,
}

impl ContentBuilder {
    pub fn new(config: SiteConfig) -> Self {
        let pipeline = MarkdownPipeline::from_config(&config.markdown);
        Self {
            config,
            schema: hook_schema(),
            pipeline,
        }
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// Documents matching the collection pattern, relative to the root and
    /// sorted by path.
    pub fn discover(&self) -> Result<Vec<PathBuf>, AppError> {
        let root = &self.config.root;
        if !root.is_dir() {
            return Err(AppError::Io(format!(
                "Content root '{}' is not a readable directory",
                root.display()
            )));
        }

        let pattern = Pattern::new(&self.config.collections.hooks.pattern)
            .map_err(|e| AppError::Config(format!("Invalid collection pattern: {e}")))?;
        let options = MatchOptions {
            case_sensitive: true,
            require_literal_separator: true,
            require_literal_leading_dot: false,
        };

        let mut documents = Vec::new();
        for entry in WalkDir::new(root).follow_links(true) {
            let entry = entry
                .map_err(|e| AppError::Io(format!("Failed to scan '{}': {e}", root.display())))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(root) else {
                continue;
            };
            if pattern.matches_with(&display_path(relative), options) {
                documents.push(relative.to_path_buf());
            }
        }

        documents.sort();
        Ok(documents)
    }

    /// Validate and compile every document without writing anything.
    pub fn check(&self) -> Result<BuildReport, AppError> {
        let compiled = self.compile()?;
        Ok(BuildReport {
            assets: compiled.assets.len(),
            hooks: compiled.hooks,
            failures: compiled.failures,
            output: None,
        })
    }

    /// Run the full build: compile, clean, write data and assets.
    ///
    /// In strict mode any document failure aborts before output is touched.
    pub fn build(&self) -> Result<BuildReport, AppError> {
        let compiled = self.compile()?;

        if self.config.strict && !compiled.failures.is_empty() {
            let details = compiled
                .failures
                .iter()
                .map(|f| f.error.to_string())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(AppError::Build(format!(
                "{} document(s) failed: {details}",
                compiled.failures.len()
            )));
        }

        if self.config.output.clean {
            self.clean()?;
        }

        let output = self.write_collection(&compiled.hooks)?;
        self.copy_assets(&compiled.assets)?;
        self.write_theme_stylesheet()?;

        tracing::info!(
            "Built {} {} record(s), {} asset(s), {} failure(s)",
            compiled.hooks.len(),
            self.config.collections.hooks.name,
            compiled.assets.len(),
            compiled.failures.len()
        );

        Ok(BuildReport {
            assets: compiled.assets.len(),
            hooks: compiled.hooks,
            failures: compiled.failures,
            output: Some(output),
        })
    }

    fn compile(&self) -> Result<Compiled, AppError> {
        let documents = self.discover()?;
        tracing::info!(
            "Compiling {} document(s) from '{}'",
            documents.len(),
            self.config.root.display()
        );

        let mut hooks: Vec<Hook> = Vec::with_capacity(documents.len());
        let mut assets: Vec<ExtractedAsset> = Vec::new();
        let mut failures = Vec::new();
        let mut slugs = HashSet::new();

        for relative in &documents {
            let document = display_path(relative);
            let result = self.compile_document(relative, &document).and_then(|compiled| {
                if slugs.insert(compiled.0.slug.clone()) {
                    Ok(compiled)
                } else {
                    Err(AppError::DuplicateSlug {
                        slug: compiled.0.slug,
                        document: document.clone(),
                    })
                }
            });

            match result {
                Ok((hook, found)) => {
                    tracing::debug!("Compiled '{}' as '{}'", document, hook.slug);
                    for asset in found {
                        if !assets.iter().any(|a| a.file_name == asset.file_name) {
                            assets.push(asset);
                        }
                    }
                    hooks.push(hook);
                }
                Err(error) => {
                    tracing::warn!("Skipping '{}': {}", document, error);
                    failures.push(DocumentFailure { document, error });
                }
            }
        }

        hooks.sort_by(|a, b| a.slug.cmp(&b.slug));
        Ok(Compiled {
            hooks,
            assets,
            failures,
        })
    }

    fn compile_document(
        &self,
        relative: &Path,
        document: &str,
    ) -> Result<(Hook, Vec<ExtractedAsset>), AppError> {
        let path = self.config.root.join(relative);
        let source = std::fs::read_to_string(&path)
            .map_err(|e| AppError::Io(format!("Failed to read '{}': {e}", path.display())))?;

        let parsed = split_front_matter(document, &source)?;
        let slug = path_slug(relative);
        let document_dir = path.parent().unwrap_or(self.config.root.as_path());
        let asset_options = AssetOptions {
            base: self.config.output.base.clone(),
            name_template: self.config.output.name.clone(),
        };

        let mut assets = Vec::new();
        let mut compile = |body: &str| -> Result<String, AppError> {
            let (events, found) = extract_assets(parse(body), document_dir, &asset_options)?;
            assets.extend(found);
            self.pipeline.render_events(events).map_err(|e| match e {
                AppError::Render(msg) => AppError::Render(format!("{document}: {msg}")),
                other => other,
            })
        };

        let input = SchemaInput {
            document,
            slug: &slug,
            front_matter: &parsed.front_matter,
            body: &parsed.body,
        };
        let hook = validate_hook(&self.schema, &input, &mut compile)?;

        Ok((hook, assets))
    }

    fn clean(&self) -> Result<(), AppError> {
        for dir in [&self.config.output.data, &self.config.output.assets] {
            if dir.exists() {
                tracing::debug!("Cleaning '{}'", dir.display());
                std::fs::remove_dir_all(dir).map_err(|e| {
                    AppError::Io(format!("Failed to clean '{}': {e}", dir.display()))
                })?;
            }
        }
        Ok(())
    }

    fn write_collection(&self, hooks: &[Hook]) -> Result<PathBuf, AppError> {
        let data_dir = &self.config.output.data;
        std::fs::create_dir_all(data_dir)?;

        let path = data_dir.join(format!("{HOOKS_COLLECTION_KEY}.json"));
        let json = serde_json::to_string_pretty(hooks)
            .map_err(|e| AppError::Internal(format!("Failed to serialize records: {e}")))?;
        std::fs::write(&path, json)
            .map_err(|e| AppError::Io(format!("Failed to write '{}': {e}", path.display())))?;

        Ok(path)
    }

    fn copy_assets(&self, assets: &[ExtractedAsset]) -> Result<(), AppError> {
        if assets.is_empty() {
            return Ok(());
        }

        let assets_dir = &self.config.output.assets;
        std::fs::create_dir_all(assets_dir)?;
        for asset in assets {
            let target = assets_dir.join(&asset.file_name);
            std::fs::copy(&asset.source, &target).map_err(|e| {
                AppError::Io(format!(
                    "Failed to copy '{}' to '{}': {e}",
                    asset.source.display(),
                    target.display()
                ))
            })?;
        }
        Ok(())
    }

    fn write_theme_stylesheet(&self) -> Result<(), AppError> {
        let markdown = &self.config.markdown;
        match resolve_theme(&markdown.theme, markdown.themes_dir.as_deref())? {
            Some(theme) => {
                let path = self
                    .config
                    .output
                    .data
                    .join(format!("{}.css", markdown.theme));
                std::fs::write(&path, theme_css(&theme)?).map_err(|e| {
                    AppError::Io(format!("Failed to write '{}': {e}", path.display()))
                })?;
            }
            None => tracing::warn!(
                "Theme '{}' not found, skipping highlight stylesheet",
                markdown.theme
            ),
        }
        Ok(())
    }
}

/// `/`-separated form of a relative path.
fn display_path(relative: &Path) -> String {
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
