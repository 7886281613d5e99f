//! Readme format detection.
//!
//! Classification runs in two phases:
//! 1. NUL byte heuristic (git's binary detection approach)
//! 2. File extension (markdown vs everything else)

use std::path::Path;

/// Maximum bytes to check for NUL byte heuristic (git uses 8KB).
const BINARY_CHECK_LEN: usize = 8192;

/// Extensions rendered as markdown, compared case-insensitively.
const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown"];

/// How a readme is turned into HTML.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadmeFormat {
    /// Rendered through the markdown renderer, then sanitized
    Markdown,
    /// Escaped and wrapped in a preformatted block
    PlainText,
    /// Not displayable
    Binary,
}

/// Detects readme format from file name and content.
///
/// # Arguments
///
/// * `bytes`: Raw readme content
/// * `path`: Readme path for extension checking
///
/// # Examples
///
/// ```
/// use pkgdoc::{ReadmeFormat, detect_format};
/// use std::path::Path;
///
/// assert_eq!(detect_format(b"# Title", Path::new("README.md")), ReadmeFormat::Markdown);
/// assert_eq!(detect_format(b"Title", Path::new("liesmich")), ReadmeFormat::PlainText);
/// ```
pub fn detect_format(bytes: &[u8], path: &Path) -> ReadmeFormat {
    let check_len = bytes.len().min(BINARY_CHECK_LEN);
    if bytes[..check_len].contains(&0) {
        return ReadmeFormat::Binary;
    }

    if is_markdown(path) {
        ReadmeFormat::Markdown
    } else {
        ReadmeFormat::PlainText
    }
}

/// Checks whether the file extension marks a markdown document.
pub fn is_markdown(path: impl AsRef<Path>) -> bool {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            MARKDOWN_EXTENSIONS
                .iter()
                .any(|md| ext.eq_ignore_ascii_case(md))
        })
        .unwrap_or(false)
}
