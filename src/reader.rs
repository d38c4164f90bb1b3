//! GFM Markdown content reader.
//! Derives a slug from the file's location below the content root, parses
//! the `Key: value` metadata header, and renders the remaining body to an
//! HTML fragment. Articles that declare a title are re-slugged from the
//! title instead of the path.

use crate::error::{BuildError, BuildResult};
use crate::pipeline::ContentReader;
use indexmap::IndexMap;
use pulldown_cmark::{html, Options, Parser};
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

/// File extensions this reader claims. The builtin Markdown handler must
/// not be registered alongside it; which handler wins would otherwise be
/// non-deterministic.
pub const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown", "mkd", "mdown"];

/// One parsed content source file.
#[derive(Debug)]
pub struct Page {
    pub metadata: IndexMap<String, String>,
    pub html: String,
}

/// Markdown-to-HTML rendering, behind a trait so the backing library is
/// swappable.
pub trait Renderer {
    fn render(&self, markdown: &str) -> String;
}

/// GitHub-Flavored Markdown renderer.
pub struct GfmRenderer;

impl Renderer for GfmRenderer {
    fn render(&self, markdown: &str) -> String {
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_GFM;
        let parser = Parser::new_ext(markdown, options);
        let mut out = String::new();
        html::push_html(&mut out, parser);
        out
    }
}

/// Metadata is specified as single, colon-separated lines at the top of
/// the file, such as `Title: this is the title`. The key starts in column
/// 0, matches letters only, and is lower-cased on storage.
fn metadata_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([A-Za-z]+): (.*)$").unwrap())
}

pub struct MarkdownReader<R: Renderer> {
    renderer: R,
}

impl MarkdownReader<GfmRenderer> {
    pub fn gfm() -> Self {
        MarkdownReader {
            renderer: GfmRenderer,
        }
    }
}

impl<R: Renderer> MarkdownReader<R> {
    pub fn new(renderer: R) -> Self {
        MarkdownReader { renderer }
    }

    /// Parses metadata and body from `text`, with the slug already derived
    /// from `relpath` (the path below the content root).
    pub fn read_source(&self, relpath: &Path, text: &str) -> BuildResult<(String, IndexMap<String, String>)> {
        let parts: Vec<&str> = relpath
            .iter()
            .map(|c| c.to_str().unwrap_or_default())
            .collect();

        let mut metadata = IndexMap::new();
        metadata.insert("slug".to_string(), path_slug(&parts));

        let lines: Vec<&str> = text.lines().collect();
        let mut body_start = lines.len();
        for (i, line) in lines.iter().enumerate() {
            if let Some(caps) = metadata_re().captures(line) {
                let name = caps[1].trim().to_lowercase();
                // A 'slug' header never overrides the derived slug.
                if name != "slug" {
                    metadata.insert(name, caps[2].trim().to_string());
                }
            } else if line.trim().is_empty() {
                continue;
            } else {
                // Reached actual content.
                body_start = i;
                break;
            }
        }

        // Articles with a title are slugged from it, which changes the
        // generated file name.
        if parts.first() == Some(&"articles") {
            if let Some(title) = metadata.get("title") {
                let slug = slugify(title);
                metadata.insert("slug".to_string(), slug);
            }
        }

        let body = lines[body_start..].join("\n");
        Ok((body, metadata))
    }

    fn read_file(&self, content_root: &Path, path: &Path) -> BuildResult<Page> {
        let text = fs::read_to_string(path).map_err(|e| BuildError::ContentError {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let relpath = path.strip_prefix(content_root).unwrap_or(path);
        let (body, metadata) = self.read_source(relpath, &text)?;

        let html = self.renderer.render(&body);
        if html.trim().is_empty() {
            return Err(BuildError::ContentError {
                path: path.display().to_string(),
                reason: "rendering produced no output".to_string(),
            });
        }
        Ok(Page { metadata, html })
    }
}

impl<R: Renderer> ContentReader for MarkdownReader<R> {
    fn read(&self, content_root: &Path, path: &Path) -> BuildResult<Page> {
        self.read_file(content_root, path)
    }
}

/// The target file name: the source path below the content root, minus
/// its first component (`pages/` or `articles/`) and its extension.
fn path_slug(parts: &[&str]) -> String {
    let mut parts: Vec<String> = parts.iter().map(|s| s.to_string()).collect();
    if let Some(last) = parts.last_mut() {
        if let Some(stem) = Path::new(last.as_str()).file_stem() {
            *last = stem.to_string_lossy().into_owned();
        }
    }
    if parts.len() > 1 {
        parts.remove(0);
    }
    parts.join("/")
}

/// Lower-cases and dash-joins a title into a slug.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}
