use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// A compiled hook article, as written by the content build.
///
/// Field names follow the camelCase JSON layout pages read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hook {
    /// Path-derived slug (e.g. `docs/use-debounce`).
    pub slug: String,
    /// The slug without its first path segment, used for routing.
    pub slug_as_params: String,
    pub title: String,
    pub description: String,
    /// Publication date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
    #[serde(default = "default_published")]
    pub published: bool,
    /// Marks recently added hooks.
    #[serde(rename = "new", default)]
    pub is_new: bool,
    /// Rendered HTML body.
    pub body: String,
}

fn default_published() -> bool {
    true
}

/// Drop the first path segment of a slug: `docs/a/b` becomes `a/b`.
pub fn slug_as_params(slug: &str) -> String {
    slug.split('/').skip(1).collect::<Vec<_>>().join("/")
}

/// Read-only view over a compiled collection of hooks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HookCollection {
    hooks: Vec<Hook>,
}

impl HookCollection {
    pub fn new(hooks: Vec<Hook>) -> Self {
        Self { hooks }
    }

    /// Parse a collection from the JSON array the build writes.
    pub fn from_json(json: &str) -> Result<Self, AppError> {
        let hooks: Vec<Hook> = serde_json::from_str(json)
            .map_err(|e| AppError::Internal(format!("Invalid collection data: {e}")))?;
        Ok(Self::new(hooks))
    }

    /// Load a collection file from disk.
    pub fn load(path: &std::path::Path) -> Result<Self, AppError> {
        let json = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                AppError::NotFound(format!("Collection file '{}'", path.display()))
            }
            _ => AppError::Io(format!("Failed to read '{}': {e}", path.display())),
        })?;
        Self::from_json(&json)
    }

    pub fn all(&self) -> &[Hook] {
        &self.hooks
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    pub fn by_slug(&self, slug: &str) -> Option<&Hook> {
        self.hooks.iter().find(|h| h.slug == slug)
    }

    pub fn by_slug_as_params(&self, params: &str) -> Option<&Hook> {
        let params = params.trim_matches('/');
        self.hooks.iter().find(|h| h.slug_as_params == params)
    }

    /// Published hooks, in collection order.
    pub fn published(&self) -> impl Iterator<Item = &Hook> {
        self.hooks.iter().filter(|h| h.published)
    }
}
