use std::collections::HashMap;
use std::path::{Component, Path};

/// Slug of a document from its path relative to the content root.
///
/// Segments are joined with `/`, the extension is dropped and a trailing
/// `index` segment is removed: `docs/a/b.mdx` becomes `docs/a/b`,
/// `docs/a/index.mdx` becomes `docs/a`.
pub fn path_slug(relative: &Path) -> String {
    let without_ext = relative.with_extension("");
    let mut segments: Vec<String> = without_ext
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    if segments.len() > 1 && segments.last().map(String::as_str) == Some("index") {
        segments.pop();
    }

    segments.join("/")
}

/// Turn heading text into an anchor id, GitHub style.
///
/// Lowercases, keeps letters, digits, `-` and `_`, and maps spaces to `-`.
pub fn slugify(text: &str) -> String {
    text.trim()
        .to_lowercase()
        .chars()
        .filter_map(|c| match c {
            ' ' => Some('-'),
            '-' | '_' => Some(c),
            c if c.is_alphanumeric() => Some(c),
            _ => None,
        })
        .collect()
}

/// Hands out unique anchor ids within one document.
///
/// Repeated slugs get `-1`, `-2`, ... appended.
#[derive(Debug, Default)]
pub struct Slugger {
    occurrences: HashMap<String, usize>,
}

impl Slugger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slug(&mut self, text: &str) -> String {
        let original = slugify(text);
        self.reserve(original)
    }

    /// Claim an id as-is (or its next free variant).
    pub fn reserve(&mut self, original: String) -> String {
        let mut slug = original.clone();
        while self.occurrences.contains_key(&slug) {
            let count = self.occurrences.entry(original.clone()).or_insert(0);
            *count += 1;
            slug = format!("{original}-{count}");
        }
        self.occurrences.insert(slug.clone(), 0);
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_path_slug_nested() {
        assert_eq!(path_slug(&PathBuf::from("docs/a/b.mdx")), "docs/a/b");
    }

    #[test]
    fn test_path_slug_index() {
        assert_eq!(path_slug(&PathBuf::from("docs/a/index.mdx")), "docs/a");
        assert_eq!(path_slug(&PathBuf::from("index.mdx")), "index");
    }

    #[test]
    fn test_path_slug_keeps_inner_dots() {
        assert_eq!(path_slug(&PathBuf::from("docs/v1.2/x.mdx")), "docs/v1.2/x");
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Getting Started"), "getting-started");
        assert_eq!(slugify("What's `useState`?"), "whats-usestate");
        assert_eq!(slugify("API: v2.0 (beta)"), "api-v20-beta");
        assert_eq!(slugify("snake_case and-dash"), "snake_case-and-dash");
        assert_eq!(slugify("Ünïcödé"), "ünïcödé");
    }

    #[test]
    fn test_slugger_deduplicates() {
        let mut slugger = Slugger::new();
        assert_eq!(slugger.slug("Usage"), "usage");
        assert_eq!(slugger.slug("Usage"), "usage-1");
        assert_eq!(slugger.slug("Usage"), "usage-2");
        assert_eq!(slugger.slug("Usage 1"), "usage-1-1");
    }

    #[test]
    fn test_slugger_reserve_blocks_generated() {
        let mut slugger = Slugger::new();
        assert_eq!(slugger.reserve("usage".to_string()), "usage");
        assert_eq!(slugger.slug("Usage"), "usage-1");
    }
}
