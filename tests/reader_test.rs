use buildsite::pipeline::{ContentReader, Pipeline};
use buildsite::reader::{slugify, MarkdownReader, MARKDOWN_EXTENSIONS};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

#[test]
fn test_slugify() {
    assert_eq!(slugify("Hello"), "hello");
    assert_eq!(slugify("Hello, World!"), "hello-world");
    assert_eq!(slugify("  Release 1.2.3  "), "release-1-2-3");
    assert_eq!(slugify("---"), "");
}

#[test]
fn test_article_title_overrides_path_slug() {
    let reader = MarkdownReader::gfm();
    let (body, metadata) = reader
        .read_source(Path::new("articles/post.md"), "Title: Hello\n\nBody text")
        .unwrap();

    assert_eq!(metadata.get("slug").unwrap(), "hello");
    assert_eq!(metadata.get("title").unwrap(), "Hello");
    assert_eq!(body, "Body text");
}

#[test]
fn test_page_keeps_path_slug() {
    let reader = MarkdownReader::gfm();
    let (_, metadata) = reader
        .read_source(Path::new("pages/docs/install.md"), "Title: Install\n\nText")
        .unwrap();

    // Only articles are re-slugged from the title.
    assert_eq!(metadata.get("slug").unwrap(), "docs/install");
}

#[test]
fn test_no_metadata_yields_only_path_slug() {
    let reader = MarkdownReader::gfm();
    let (body, metadata) = reader
        .read_source(Path::new("pages/about.md"), "Just some body text.")
        .unwrap();

    assert_eq!(metadata.len(), 1);
    assert_eq!(metadata.get("slug").unwrap(), "about");
    assert_eq!(body, "Just some body text.");
}

#[test]
fn test_metadata_keys_lowercased_and_slug_header_ignored() {
    let reader = MarkdownReader::gfm();
    let text = "Title: A Page\nAUTHOR: someone\nSlug: sneaky\n\nbody";
    let (_, metadata) = reader
        .read_source(Path::new("pages/a.md"), text)
        .unwrap();

    assert_eq!(metadata.get("author").unwrap(), "someone");
    // The derived slug wins over a slug header line.
    assert_eq!(metadata.get("slug").unwrap(), "a");
}

#[test]
fn test_blank_lines_between_metadata_are_skipped() {
    let reader = MarkdownReader::gfm();
    let text = "Title: A Page\n\nAuthor: someone\n\nFirst paragraph.\nSecond line.";
    let (body, metadata) = reader
        .read_source(Path::new("pages/a.md"), text)
        .unwrap();

    assert_eq!(metadata.get("author").unwrap(), "someone");
    assert_eq!(body, "First paragraph.\nSecond line.");
}

#[test]
fn test_read_renders_markdown_body() {
    let dir = TempDir::new().unwrap();
    let pages = dir.path().join("pages");
    fs::create_dir_all(&pages).unwrap();
    let path = pages.join("index.md");
    fs::write(&path, "Title: Home\n\n# Welcome\n\nSome *text*.").unwrap();

    let reader = MarkdownReader::gfm();
    let page = reader.read(dir.path(), &path).unwrap();

    assert!(page.html.contains("<h1>"));
    assert!(page.html.contains("<em>text</em>"));
    assert_eq!(page.metadata.get("title").unwrap(), "Home");
}

#[test]
fn test_empty_body_is_an_error() {
    let dir = TempDir::new().unwrap();
    let pages = dir.path().join("pages");
    fs::create_dir_all(&pages).unwrap();
    let path = pages.join("empty.md");
    fs::write(&path, "Title: Only Metadata\n").unwrap();

    let reader = MarkdownReader::gfm();
    let err = reader.read(dir.path(), &path).unwrap_err();
    assert!(matches!(
        err,
        buildsite::error::BuildError::ContentError { .. }
    ));
}

#[test]
fn test_duplicate_reader_registration_is_an_error() {
    let mut pipeline = Pipeline::new();
    for ext in MARKDOWN_EXTENSIONS {
        pipeline
            .register_reader(ext, Box::new(MarkdownReader::gfm()))
            .unwrap();
    }
    let err = pipeline
        .register_reader("md", Box::new(MarkdownReader::gfm()))
        .unwrap_err();
    assert!(matches!(err, buildsite::error::BuildError::ConfigError(_)));
}

#[test]
fn test_preflight_checks_markdown_files() {
    let dir = TempDir::new().unwrap();
    let content = dir.path().join("content");
    fs::create_dir_all(content.join("pages")).unwrap();
    fs::write(content.join("pages/ok.md"), "Title: Ok\n\ntext").unwrap();
    fs::write(content.join("pages/style.css"), "body {}").unwrap();

    let mut pipeline = Pipeline::new();
    pipeline
        .register_reader("md", Box::new(MarkdownReader::gfm()))
        .unwrap();

    let checked = pipeline.preflight(&content).unwrap();
    assert_eq!(checked, 1);
}

#[test]
fn test_preflight_propagates_reader_errors() {
    let dir = TempDir::new().unwrap();
    let content = dir.path().join("content");
    fs::create_dir_all(content.join("pages")).unwrap();
    fs::write(content.join("pages/bad.md"), "Title: No Body\n").unwrap();

    let mut pipeline = Pipeline::new();
    pipeline
        .register_reader("md", Box::new(MarkdownReader::gfm()))
        .unwrap();

    assert!(pipeline.preflight(&content).is_err());
}
