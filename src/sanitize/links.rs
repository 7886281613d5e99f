//! Link resolution for relative readme URLs.

use ammonia::UrlRelativeEvaluate;
use anyhow::{Context, Result, bail};
use std::borrow::Cow;
use tracing::debug;
use url::Url;

/// Resolves relative links in sanitized readmes.
///
/// With a base URL, repository internal links (`docs/api.md`,
/// `../logo.png`, `/CHANGELOG.md`) become absolute URLs under that base.
/// Without one they pass through unchanged. Fragment-only links are
/// prefixed to match the prefixed element ids.
#[derive(Debug, Clone)]
pub struct LinkResolver {
    base: Option<Url>,
    fragment_prefix: Option<&'static str>,
}

impl LinkResolver {
    /// Creates link resolver for the given base URL.
    ///
    /// The base is treated as a directory: a missing trailing slash is
    /// added so `https://host/repo` resolves `a.md` to
    /// `https://host/repo/a.md`.
    ///
    /// # Arguments
    ///
    /// * `base`: Absolute URL of the repository root, if known
    /// * `fragment_prefix`: Prefix applied to fragment-only links
    pub fn new(base: Option<Url>, fragment_prefix: Option<&'static str>) -> Self {
        let base = base.map(|mut url| {
            if !url.path().ends_with('/') {
                let path = format!("{}/", url.path());
                url.set_path(&path);
            }
            url
        });

        Self {
            base,
            fragment_prefix,
        }
    }

    /// Resolves a relative link.
    ///
    /// Handles different link types:
    /// - Fragment links (#section) stay in page, prefixed if configured
    /// - Protocol relative links (//host/path) take the base scheme
    /// - Root relative paths (/file.md) resolve against the repository root
    /// - Relative paths (./file.md, ../file.md) resolve against the base
    ///
    /// # Errors
    ///
    /// Returns error if the path escapes the repository root or the
    /// result is not a valid URL
    pub fn resolve(&self, link: &str) -> Result<String> {
        if let Some(fragment) = link.strip_prefix('#') {
            return Ok(match self.fragment_prefix {
                Some(prefix) if !fragment.is_empty() && !fragment.starts_with(prefix) => {
                    format!("#{}{}", prefix, fragment)
                }
                _ => link.to_string(),
            });
        }

        let Some(base) = &self.base else {
            return Ok(link.to_string());
        };

        if link.starts_with("//") {
            return base
                .join(link)
                .map(String::from)
                .with_context(|| format!("Invalid protocol relative link: {}", link));
        }

        let relative = link.trim_start_matches('/');
        let split = relative.find(['?', '#']).unwrap_or(relative.len());
        let (path, suffix) = relative.split_at(split);

        let mut normalized = normalize_path(path)?.join("/");
        if path.ends_with('/') && !normalized.is_empty() {
            normalized.push('/');
        }

        base.join(&format!("./{}{}", normalized, suffix))
            .map(String::from)
            .with_context(|| format!("Failed to resolve link: {}", link))
    }
}

impl<'a> UrlRelativeEvaluate<'a> for LinkResolver {
    fn evaluate<'url>(&self, url: &'url str) -> Option<Cow<'url, str>> {
        match self.resolve(url) {
            Ok(resolved) if resolved == url => Some(Cow::Borrowed(url)),
            Ok(resolved) => Some(Cow::Owned(resolved)),
            Err(e) => {
                debug!(url, error = %e, "dropping unresolvable link");
                None
            }
        }
    }
}

/// Normalizes a URL path by resolving `..` and `.` segments.
///
/// Security: Prevents traversal outside the repository root.
///
/// # Errors
///
/// Returns error if the path attempts to escape the repository root
fn normalize_path(path: &str) -> Result<Vec<&str>> {
    let mut components = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if components.pop().is_none() {
                    bail!("Path escapes repository root: {}", path);
                }
            }
            segment => components.push(segment),
        }
    }

    Ok(components)
}
