//! Readme resolution and normalization.
//!
//! Locates a package readme by manifest hint or naming convention, fetches
//! it from the repository's root identifier, and turns it into an HTML
//! fragment that is safe to embed: markdown is rendered and sanitized,
//! everything else is escaped into a preformatted block.

mod format;

pub use format::{ReadmeFormat, detect_format, is_markdown};

use anyhow::Result;
use maud::html;
use std::path::Path;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::manifest::ManifestInfo;
use crate::markdown::MarkdownRenderer;
use crate::repository::RepositoryHandle;
use crate::sanitize::Sanitizer;

/// Conventional readme names, tried in order when the manifest has no hint.
pub const README_CANDIDATES: &[&str] = &[
    "README.md",
    "README.markdown",
    "readme.md",
    "Readme.md",
    "README.rst",
    "README.txt",
    "README",
    "readme",
    "liesmich",
    "leiami",
    "LIESMICH",
];

/// Tunables for [`ReadmeResolver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverOptions {
    /// Drop a leading `<h1>`/`<h2>`, which usually repeats the package name.
    pub strip_title_heading: bool,
    /// File names tried when the manifest names no readme.
    pub candidates: &'static [&'static str],
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            strip_title_heading: true,
            candidates: README_CANDIDATES,
        }
    }
}

/// Produces the stored readme value for a package.
///
/// Holds the markdown renderer and sanitizer so one instance can serve
/// many update cycles; resolving itself keeps no state between calls.
pub struct ReadmeResolver<'a> {
    renderer: MarkdownRenderer<'a>,
    sanitizer: Sanitizer,
    options: ResolverOptions,
}

impl<'a> ReadmeResolver<'a> {
    /// Creates resolver with default options and the readme sanitize policy.
    pub fn new() -> Self {
        Self::with_options(ResolverOptions::default())
    }

    /// Creates resolver with custom options.
    pub fn with_options(options: ResolverOptions) -> Self {
        Self {
            renderer: MarkdownRenderer::new(),
            sanitizer: Sanitizer::default(),
            options,
        }
    }

    /// Replaces the sanitizer.
    pub fn with_sanitizer(mut self, sanitizer: Sanitizer) -> Self {
        self.sanitizer = sanitizer;
        self
    }

    /// Options in effect.
    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    /// Resolves the readme of the repository to a sanitized HTML fragment.
    ///
    /// Uses the manifest readme hint when present, fetching exactly that
    /// path. Otherwise tries each conventional name until one exists. All
    /// fetches use the repository's root identifier.
    ///
    /// Missing, unreadable and binary readmes yield `None`; fetch errors
    /// are logged and never propagated. A fetch error while probing
    /// conventional names stops the search.
    ///
    /// # Arguments
    ///
    /// * `manifest`: Parsed package manifest
    /// * `repo`: Repository to read from
    ///
    /// # Returns
    ///
    /// Sanitized HTML fragment, or None when no readme is available
    #[instrument(skip_all, fields(reference = repo.root_identifier()))]
    pub fn resolve(&self, manifest: &ManifestInfo, repo: &dyn RepositoryHandle) -> Option<String> {
        let reference = repo.root_identifier();

        let (path, bytes) = match manifest.readme_hint() {
            Some(hint) => (hint, fetch(repo, hint, reference).ok()??),
            None => self.probe_candidates(repo, reference)?,
        };

        debug!(path, size = bytes.len(), "fetched readme");

        self.render_content(
            path,
            &bytes,
            repo.base_url().as_ref(),
            repo.image_base_url().as_ref(),
        )
    }

    /// Renders already fetched readme bytes.
    ///
    /// # Arguments
    ///
    /// * `path`: Readme path, used for format detection
    /// * `bytes`: Raw readme content
    /// * `base_url`: Absolute URL relative links resolve against
    /// * `image_base_url`: Absolute URL relative image sources resolve against
    pub fn render_content(
        &self,
        path: &str,
        bytes: &[u8],
        base_url: Option<&Url>,
        image_base_url: Option<&Url>,
    ) -> Option<String> {
        match detect_format(bytes, Path::new(path)) {
            ReadmeFormat::Binary => {
                debug!(path, "readme looks binary, skipping");
                None
            }
            ReadmeFormat::PlainText => Some(wrap_plain_text(&String::from_utf8_lossy(bytes))),
            ReadmeFormat::Markdown => {
                self.render_markdown(&String::from_utf8_lossy(bytes), base_url, image_base_url)
            }
        }
    }

    fn render_markdown(
        &self,
        source: &str,
        base_url: Option<&Url>,
        image_base_url: Option<&Url>,
    ) -> Option<String> {
        let rendered = self.renderer.render(source);
        let sanitized = self
            .sanitizer
            .sanitize_with_image_base(&rendered, base_url, image_base_url);

        let body = if self.options.strip_title_heading {
            strip_title_heading(&sanitized)
        } else {
            &sanitized
        };

        let body = body.trim();
        (!body.is_empty()).then(|| body.to_string())
    }

    fn probe_candidates(
        &self,
        repo: &dyn RepositoryHandle,
        reference: &str,
    ) -> Option<(&'static str, Vec<u8>)> {
        for &name in self.options.candidates {
            match fetch(repo, name, reference) {
                Ok(Some(bytes)) => return Some((name, bytes)),
                Ok(None) => continue,
                Err(_) => return None,
            }
        }

        debug!(reference, "no conventional readme found");
        None
    }
}

impl<'a> Default for ReadmeResolver<'a> {
    fn default() -> Self {
        Self::new()
    }
}

/// Fetches one path, logging absence and failures.
fn fetch(repo: &dyn RepositoryHandle, path: &str, reference: &str) -> Result<Option<Vec<u8>>> {
    let content = repo.file_content(path, reference).inspect_err(|e| {
        warn!(path, reference, error = %format!("{:#}", e), "failed to fetch readme");
    })?;

    if content.is_none() {
        debug!(path, reference, "readme not present");
    }

    Ok(content)
}

/// Escapes text and wraps it in a single preformatted block.
pub fn wrap_plain_text(text: &str) -> String {
    html! { pre { (text) } }.into_string()
}

/// Drops a leading `<h1>` or `<h2>` element.
///
/// Only the first element of the fragment is considered: a readme that
/// opens with a section heading such as `## Installation` loses it, and
/// headings after other content are always kept. Disable
/// [`ResolverOptions::strip_title_heading`] for readmes laid out that way.
fn strip_title_heading(html: &str) -> &str {
    let trimmed = html.trim_start();

    for tag in ["h1", "h2"] {
        let Some(rest) = trimmed.strip_prefix('<').and_then(|t| t.strip_prefix(tag)) else {
            continue;
        };
        if !rest.starts_with(['>', ' ']) {
            continue;
        }

        let close = format!("</{}>", tag);
        if let Some(end) = trimmed.find(&close) {
            return &trimmed[end + close.len()..];
        }
    }

    html
}
