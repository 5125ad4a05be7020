mod common;

use common::{hook_doc, valid_doc, TestSite};
use hookshelf::content::builder::ContentBuilder;
use hookshelf::error::AppError;
use hookshelf::models::hook::HookCollection;

#[test]
fn build_writes_sorted_collection() {
    let site = TestSite::new();
    site.write("docs/use-toggle.mdx", valid_doc("useToggle"));
    site.write("docs/state/use-counter.mdx", valid_doc("useCounter"));
    site.write("docs/notes.md", valid_doc("ignored"));
    site.write("blog/post.mdx", valid_doc("ignored"));

    let report = ContentBuilder::new(site.config()).build().unwrap();

    assert!(report.is_success());
    let slugs: Vec<&str> = report.hooks.iter().map(|h| h.slug.as_str()).collect();
    assert_eq!(slugs, vec!["docs/state/use-counter", "docs/use-toggle"]);

    let output = report.output.expect("collection path");
    assert_eq!(output, site.data_dir().join("hooks.json"));

    let collection = HookCollection::load(&output).unwrap();
    assert_eq!(collection.len(), 2);
    let counter = collection.by_slug_as_params("state/use-counter").unwrap();
    assert_eq!(counter.title, "useCounter");
}

#[test]
fn nested_document_slug_and_params() {
    let site = TestSite::new();
    site.write("docs/a/b.mdx", valid_doc("b"));

    let report = ContentBuilder::new(site.config()).build().unwrap();
    let hook = &report.hooks[0];
    assert_eq!(hook.slug, "docs/a/b");
    assert_eq!(hook.slug_as_params, "a/b");
}

#[test]
fn defaults_for_published_and_new() {
    let site = TestSite::new();
    site.write("docs/x.mdx", valid_doc("x"));

    let report = ContentBuilder::new(site.config()).build().unwrap();
    assert!(report.hooks[0].published);
    assert!(!report.hooks[0].is_new);

    let json = std::fs::read_to_string(site.data_dir().join("hooks.json")).unwrap();
    assert!(json.contains("\"slugAsParams\": \"x\""));
    assert!(json.contains("\"published\": true"));
    assert!(json.contains("\"new\": false"));
}

#[test]
fn title_over_99_characters_is_rejected() {
    let site = TestSite::new();
    site.write("docs/ok.mdx", valid_doc(&"a".repeat(99)));
    site.write("docs/too-long.mdx", valid_doc(&"a".repeat(100)));

    let report = ContentBuilder::new(site.config()).build().unwrap();

    assert_eq!(report.hooks.len(), 1);
    assert_eq!(report.hooks[0].slug, "docs/ok");
    assert_eq!(report.failures.len(), 1);
    let failure = &report.failures[0];
    assert_eq!(failure.document, "docs/too-long.mdx");
    match &failure.error {
        AppError::Schema { field, .. } => assert_eq!(field, "title"),
        other => panic!("Expected Schema error, got: {:?}", other),
    }
}

#[test]
fn emoji_title_is_measured_in_utf16_units() {
    let site = TestSite::new();
    site.write("docs/emoji.mdx", valid_doc(&"\u{1F600}".repeat(50)));

    let report = ContentBuilder::new(site.config()).build().unwrap();

    assert!(report.hooks.is_empty());
    assert_eq!(report.failures.len(), 1);
    assert!(matches!(
        &report.failures[0].error,
        AppError::Schema { field, .. } if field == "title"
    ));
}

#[test]
fn strict_build_aborts_without_writing() {
    let site = TestSite::new();
    site.write("docs/ok.mdx", valid_doc("ok"));
    site.write("docs/bad.mdx", hook_doc("title: only a title", "body"));

    let mut config = site.config();
    config.strict = true;

    let result = ContentBuilder::new(config).build();
    match result {
        Err(AppError::Build(msg)) => assert!(msg.contains("docs/bad.mdx")),
        other => panic!("Expected Build error, got: {:?}", other),
    }
    assert!(!site.data_dir().exists());
}

#[test]
fn headings_are_anchored_and_code_highlighted() {
    let site = TestSite::new();
    site.write(
        "docs/use-debounce.mdx",
        hook_doc(
            "title: useDebounce\ndescription: Debounce a value",
            "## Usage\n\n```tsx\nconst value = useDebounce(input, 300);\n```\n\n## API Reference\n",
        ),
    );

    let report = ContentBuilder::new(site.config()).build().unwrap();
    let body = &report.hooks[0].body;

    assert!(body.contains(
        "<h2 id=\"usage\"><a class=\"subheading-anchor\" aria-label=\"Link to section\" href=\"#usage\">Usage</a></h2>"
    ));
    assert!(body.contains("<h2 id=\"api-reference\">"));
    assert!(body.contains("href=\"#api-reference\""));
    assert!(body.contains("data-theme=\"github-dark\""));
    assert!(body.contains("data-language=\"tsx\""));
    assert!(body.contains("hl-tsx"));
}

#[test]
fn default_build_writes_github_dark_stylesheet() {
    let site = TestSite::new();
    site.write("docs/x.mdx", valid_doc("x"));

    ContentBuilder::new(site.config()).build().unwrap();

    let css = std::fs::read_to_string(site.data_dir().join("github-dark.css")).unwrap();
    assert!(css.contains(".hl-code"));
    assert!(css.contains("#24292e"));
}

#[test]
fn clean_removes_previous_output() {
    let site = TestSite::new();
    site.write("docs/x.mdx", valid_doc("x"));
    std::fs::create_dir_all(site.data_dir()).unwrap();
    std::fs::write(site.data_dir().join("stale.json"), "[]").unwrap();
    std::fs::create_dir_all(site.assets_dir()).unwrap();
    std::fs::write(site.assets_dir().join("old-123456.png"), "x").unwrap();

    ContentBuilder::new(site.config()).build().unwrap();

    assert!(!site.data_dir().join("stale.json").exists());
    assert!(!site.assets_dir().join("old-123456.png").exists());
    assert!(site.data_dir().join("hooks.json").exists());
}

#[test]
fn no_clean_keeps_previous_output() {
    let site = TestSite::new();
    site.write("docs/x.mdx", valid_doc("x"));
    std::fs::create_dir_all(site.data_dir()).unwrap();
    std::fs::write(site.data_dir().join("stale.json"), "[]").unwrap();

    let mut config = site.config();
    config.output.clean = false;
    ContentBuilder::new(config).build().unwrap();

    assert!(site.data_dir().join("stale.json").exists());
}

#[test]
fn images_are_copied_with_hashed_names() {
    let site = TestSite::new();
    site.write("docs/use-image/cover.png", b"abc");
    site.write(
        "docs/use-image/index.mdx",
        hook_doc(
            "title: useImage\ndescription: Load an image",
            "![Cover](./cover.png)\n",
        ),
    );

    let report = ContentBuilder::new(site.config()).build().unwrap();

    assert_eq!(report.assets, 1);
    let hook = &report.hooks[0];
    assert_eq!(hook.slug, "docs/use-image");
    assert!(hook.body.contains("src=\"/static/cover-ba7816.png\""));
    assert!(site.assets_dir().join("cover-ba7816.png").is_file());
}

#[test]
fn duplicate_slugs_are_rejected() {
    let site = TestSite::new();
    site.write("docs/dup.mdx", valid_doc("first"));
    site.write("docs/dup/index.mdx", valid_doc("second"));

    let report = ContentBuilder::new(site.config()).build().unwrap();

    assert_eq!(report.hooks.len(), 1);
    assert_eq!(report.failures.len(), 1);
    assert!(matches!(
        report.failures[0].error,
        AppError::DuplicateSlug { .. }
    ));
}

#[test]
fn malformed_front_matter_fails_only_that_document() {
    let site = TestSite::new();
    site.write("docs/good.mdx", valid_doc("good"));
    site.write("docs/broken.mdx", "---\ntitle: [oops\n---\nbody");

    let report = ContentBuilder::new(site.config()).build().unwrap();

    assert_eq!(report.hooks.len(), 1);
    assert!(matches!(
        report.failures[0].error,
        AppError::FrontMatter { .. }
    ));
}

#[test]
fn check_does_not_write() {
    let site = TestSite::new();
    site.write("docs/x.mdx", valid_doc("x"));

    let report = ContentBuilder::new(site.config()).check().unwrap();

    assert_eq!(report.hooks.len(), 1);
    assert!(report.output.is_none());
    assert!(!site.data_dir().exists());
}

#[test]
fn bundled_theme_writes_stylesheet() {
    let site = TestSite::new();
    site.write("docs/x.mdx", valid_doc("x"));

    let mut config = site.config();
    config.markdown.theme = "base16-ocean.dark".to_string();
    ContentBuilder::new(config).build().unwrap();

    let css = std::fs::read_to_string(site.data_dir().join("base16-ocean.dark.css")).unwrap();
    assert!(css.contains(".hl-"));
}

#[test]
fn missing_root_fails_whole_build() {
    let site = TestSite::new();
    std::fs::remove_dir_all(site.content_root()).unwrap();

    let result = ContentBuilder::new(site.config()).build();
    assert!(matches!(result, Err(AppError::Io(_))));
}
