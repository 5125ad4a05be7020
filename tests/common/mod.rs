use std::path::{Path, PathBuf};

use hookshelf::config::SiteConfig;
use tempfile::TempDir;

/// A throwaway site directory with a content root and output folders.
///
/// Everything is removed when the value is dropped.
pub struct TestSite {
    dir: TempDir,
}

impl TestSite {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        std::fs::create_dir_all(dir.path().join("src/content/docs"))
            .expect("Failed to create content root");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn content_root(&self) -> PathBuf {
        self.path().join("src/content")
    }

    pub fn data_dir(&self) -> PathBuf {
        self.path().join(".hookshelf")
    }

    pub fn assets_dir(&self) -> PathBuf {
        self.path().join("public/static")
    }

    /// Write a file under the content root, creating parent folders.
    pub fn write(&self, relative: &str, content: impl AsRef<[u8]>) {
        let path = self.content_root().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        std::fs::write(path, content).expect("Failed to write fixture");
    }

    /// Default configuration with every path inside this site.
    pub fn config(&self) -> SiteConfig {
        SiteConfig::default().with_base_dir(self.path())
    }
}

/// A hook document with the given front matter lines and body.
pub fn hook_doc(front_matter: &str, body: &str) -> String {
    format!("---\n{front_matter}\n---\n\n{body}")
}

/// A minimal valid hook document.
pub fn valid_doc(title: &str) -> String {
    hook_doc(
        &format!("title: {title}\ndescription: The {title} hook"),
        &format!("# {title}\n\nSome text.\n"),
    )
}
