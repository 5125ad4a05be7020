use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use pulldown_cmark::{CowStr, Event, Tag};
use regex::{Captures, Regex};
use sha2::{Digest, Sha256};

use crate::error::AppError;

static NAME_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(name|ext|hash)(?::(\d+))?\]").expect("valid token regex"));

/// Extensions of markup documents; links to them are never copied.
const DOCUMENT_EXTENSIONS: &[&str] = &["md", "mdx"];

/// How extracted assets are named and addressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetOptions {
    /// Public path prefix, ending with `/`.
    pub base: String,
    /// File name template, e.g. `[name]-[hash:6].[ext]`.
    pub name_template: String,
}

/// A file referenced from a document body that must be copied to the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedAsset {
    pub source: PathBuf,
    pub file_name: String,
}

/// Render an asset file name from the template.
///
/// `[hash]` is the hex SHA-256 of `content`; `[hash:N]` keeps its first N
/// characters.
pub fn render_asset_name(template: &str, stem: &str, ext: &str, content: &[u8]) -> String {
    let digest = format!("{:x}", Sha256::digest(content));

    let name = NAME_TOKEN.replace_all(template, |caps: &Captures| match &caps[1] {
        "name" => stem.to_string(),
        "ext" => ext.to_string(),
        _ => {
            let len = caps
                .get(2)
                .and_then(|m| m.as_str().parse::<usize>().ok())
                .unwrap_or(digest.len())
                .min(digest.len());
            digest[..len].to_string()
        }
    });

    name.trim_end_matches('.').to_string()
}

/// Whether `url` points at a file relative to the document.
fn is_relative_file(url: &str) -> bool {
    !url.is_empty()
        && !url.starts_with('/')
        && !url.starts_with('#')
        && !url.contains("://")
        && !url.starts_with("mailto:")
        && !url.starts_with("data:")
        && !url.starts_with("tel:")
}

fn strip_suffixes(url: &str) -> &str {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    &url[..end]
}

/// Copy candidates for one referenced URL, if it names an existing file.
fn resolve(
    url: &str,
    document_dir: &Path,
    options: &AssetOptions,
    is_image: bool,
) -> Result<Option<ExtractedAsset>, AppError> {
    if !is_relative_file(url) {
        return Ok(None);
    }

    let relative = strip_suffixes(url);
    let source = document_dir.join(relative);
    let ext = source
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_default();

    if !is_image && (ext.is_empty() || DOCUMENT_EXTENSIONS.contains(&ext.as_str())) {
        return Ok(None);
    }

    if !source.is_file() {
        if is_image {
            tracing::warn!("Referenced image '{}' not found", source.display());
        }
        return Ok(None);
    }

    let content = std::fs::read(&source)
        .map_err(|e| AppError::Io(format!("Failed to read asset '{}': {e}", source.display())))?;
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_name = render_asset_name(&options.name_template, &stem, &ext, &content);

    Ok(Some(ExtractedAsset { source, file_name }))
}

/// Find local images and file links in a body and point them at the
/// public asset path.
///
/// Returns the rewritten events and the files to copy.
pub fn extract_assets<'a>(
    events: Vec<Event<'a>>,
    document_dir: &Path,
    options: &AssetOptions,
) -> Result<(Vec<Event<'a>>, Vec<ExtractedAsset>), AppError> {
    let mut assets: Vec<ExtractedAsset> = Vec::new();
    let mut out = Vec::with_capacity(events.len());

    for event in events {
        let event = match event {
            Event::Start(Tag::Image {
                link_type,
                dest_url,
                title,
                id,
            }) => {
                let dest_url = match resolve(&dest_url, document_dir, options, true)? {
                    Some(asset) => rewrite(&mut assets, asset, options),
                    None => dest_url,
                };
                Event::Start(Tag::Image {
                    link_type,
                    dest_url,
                    title,
                    id,
                })
            }
            Event::Start(Tag::Link {
                link_type,
                dest_url,
                title,
                id,
            }) => {
                let dest_url = match resolve(&dest_url, document_dir, options, false)? {
                    Some(asset) => rewrite(&mut assets, asset, options),
                    None => dest_url,
                };
                Event::Start(Tag::Link {
                    link_type,
                    dest_url,
                    title,
                    id,
                })
            }
            other => other,
        };
        out.push(event);
    }

    Ok((out, assets))
}

fn rewrite<'a>(
    assets: &mut Vec<ExtractedAsset>,
    asset: ExtractedAsset,
    options: &AssetOptions,
) -> CowStr<'a> {
    let url = format!("{}{}", options.base, asset.file_name);
    if !assets.iter().any(|a| a.file_name == asset.file_name) {
        assets.push(asset);
    }
    CowStr::from(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::transform::parse;
    use pulldown_cmark::html;

    fn options() -> AssetOptions {
        AssetOptions {
            base: "/static/".to_string(),
            name_template: "[name]-[hash:6].[ext]".to_string(),
        }
    }

    fn render(events: Vec<Event<'_>>) -> String {
        let mut out = String::new();
        html::push_html(&mut out, events.into_iter());
        out
    }

    #[test]
    fn test_render_asset_name() {
        let name = render_asset_name("[name]-[hash:6].[ext]", "diagram", "png", b"abc");
        // sha256("abc") starts with ba7816
        assert_eq!(name, "diagram-ba7816.png");
    }

    #[test]
    fn test_render_asset_name_full_hash_and_no_ext() {
        let name = render_asset_name("[hash].[ext]", "x", "", b"abc");
        assert_eq!(name.len(), 64);
        assert!(!name.ends_with('.'));
    }

    #[test]
    fn test_relative_detection() {
        assert!(is_relative_file("./img.png"));
        assert!(is_relative_file("img.png"));
        assert!(!is_relative_file("/static/img.png"));
        assert!(!is_relative_file("https://example.com/img.png"));
        assert!(!is_relative_file("#anchor"));
        assert!(!is_relative_file("mailto:a@b.c"));
    }

    #[test]
    fn test_extracts_local_image() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("cover.png"), b"abc").unwrap();

        let events = parse("![Cover](./cover.png)");
        let (events, assets) = extract_assets(events, dir.path(), &options()).unwrap();

        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0].file_name, "cover-ba7816.png");
        assert!(render(events).contains("src=\"/static/cover-ba7816.png\""));
    }

    #[test]
    fn test_extracts_linked_file_but_not_documents() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("sheet.pdf"), b"pdf").unwrap();
        std::fs::write(dir.path().join("other.mdx"), b"# other").unwrap();

        let events = parse("[Sheet](sheet.pdf) and [Other](other.mdx)");
        let (events, assets) = extract_assets(events, dir.path(), &options()).unwrap();

        assert_eq!(assets.len(), 1);
        let html = render(events);
        assert!(html.contains("href=\"/static/sheet-"));
        assert!(html.contains("href=\"other.mdx\""));
    }

    #[test]
    fn test_missing_and_remote_images_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let events = parse("![a](missing.png) ![b](https://example.com/b.png)");
        let (events, assets) = extract_assets(events, dir.path(), &options()).unwrap();

        assert!(assets.is_empty());
        let html = render(events);
        assert!(html.contains("src=\"missing.png\""));
        assert!(html.contains("src=\"https://example.com/b.png\""));
    }

    #[test]
    fn test_same_image_twice_copied_once() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.png"), b"abc").unwrap();

        let events = parse("![one](a.png)\n\n![two](a.png?raw#frag)");
        let (_, assets) = extract_assets(events, dir.path(), &options()).unwrap();
        assert_eq!(assets.len(), 1);
    }
}
