//! Package readme resolution, rendering and sanitizing for git repositories.

mod config;
mod manifest;
mod markdown;
mod package;
mod preview;
mod readme;
mod repository;
mod sanitize;
mod updater;

pub use config::Config;
pub use manifest::{DEFAULT_MANIFEST, ManifestInfo, load_manifest};
pub use markdown::MarkdownRenderer;
pub use package::{PackageLink, PackageRecord};
pub use preview::preview_page;
pub use readme::{
    README_CANDIDATES, ReadmeFormat, ReadmeResolver, ResolverOptions, detect_format, is_markdown,
    wrap_plain_text,
};
pub use repository::{GitRepository, RepositoryHandle, github_base_url, github_raw_base_url};
pub use sanitize::{LinkResolver, SanitizePolicy, Sanitizer};
pub use updater::update_package;
