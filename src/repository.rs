//! Source control access for readme and manifest retrieval.

use anyhow::{Context, Result};
use gix::bstr::ByteSlice;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;
use url::Url;

/// Read access to one source control location.
///
/// Implementations are borrowed for the duration of a single update cycle.
/// Timeouts and cancellation, if any, belong to the implementation.
pub trait RepositoryHandle {
    /// Default branch or tag name the repository resolves to.
    fn root_identifier(&self) -> &str;

    /// Reads the raw content of `path` at `reference`.
    ///
    /// Returns `Ok(None)` when the path does not exist at that reference.
    ///
    /// # Errors
    ///
    /// Returns error on transient failures (unreadable objects, unknown
    /// references, unreachable repository).
    fn file_content(&self, path: &str, reference: &str) -> Result<Option<Vec<u8>>>;

    /// Absolute URL that relative readme links resolve against.
    fn base_url(&self) -> Option<Url> {
        None
    }

    /// Absolute URL that relative readme images resolve against.
    ///
    /// Defaults to [`RepositoryHandle::base_url`]. Hosts whose link base
    /// serves rendered pages rather than file content override this.
    fn image_base_url(&self) -> Option<Url> {
        self.base_url()
    }
}

/// Repository handle backed by a local git repository.
#[derive(Clone)]
pub struct GitRepository {
    repo: gix::ThreadSafeRepository,
    path: PathBuf,
    default_branch: String,
    base_url: Option<Url>,
    image_base_url: Option<Url>,
}

impl GitRepository {
    /// Opens the repository at `path`.
    ///
    /// The root identifier is the branch HEAD points at, falling back to
    /// `main` for detached or unborn heads. A GitHub `origin` remote, when
    /// present, provides the link base URL and the raw image base URL.
    ///
    /// # Errors
    ///
    /// Returns error if the repository cannot be opened or HEAD cannot be read.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let repo = gix::open(path)
            .with_context(|| format!("Failed to open repository at {}", path.display()))?;

        let head_ref = repo.head_ref().context("Failed to read HEAD reference")?;
        let default_branch = head_ref
            .and_then(|r| r.name().shorten().to_str().ok().map(|s| s.to_string()))
            .unwrap_or_else(|| "main".to_string());

        let remote = repo
            .config_snapshot()
            .string("remote.origin.url")
            .and_then(|remote| remote.to_str().ok().map(str::to_string));
        let base_url = remote.as_deref().and_then(github_base_url);
        let image_base_url = remote.as_deref().and_then(github_raw_base_url);

        debug!(
            path = %path.display(),
            branch = %default_branch,
            base_url = ?base_url.as_ref().map(Url::as_str),
            "opened repository"
        );

        Ok(Self {
            repo: repo.into_sync(),
            path: path.to_path_buf(),
            default_branch,
            base_url,
            image_base_url,
        })
    }

    /// Overrides the link base URL.
    ///
    /// The override also becomes the image base; set a separate one with
    /// [`GitRepository::with_image_base_url`] afterwards.
    pub fn with_base_url(mut self, base_url: Option<Url>) -> Self {
        if let Some(url) = base_url {
            self.image_base_url = Some(url.clone());
            self.base_url = Some(url);
        }
        self
    }

    /// Overrides the image base URL.
    pub fn with_image_base_url(mut self, image_base_url: Option<Url>) -> Self {
        if image_base_url.is_some() {
            self.image_base_url = image_base_url;
        }
        self
    }

    /// Repository path on disk.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl fmt::Debug for GitRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitRepository")
            .field("path", &self.path)
            .field("default_branch", &self.default_branch)
            .field("base_url", &self.base_url.as_ref().map(Url::as_str))
            .field("image_base_url", &self.image_base_url.as_ref().map(Url::as_str))
            .finish_non_exhaustive()
    }
}

impl RepositoryHandle for GitRepository {
    fn root_identifier(&self) -> &str {
        &self.default_branch
    }

    fn file_content(&self, path: &str, reference: &str) -> Result<Option<Vec<u8>>> {
        read_blob(&self.repo.to_thread_local(), reference, path)
    }

    fn base_url(&self) -> Option<Url> {
        self.base_url.clone()
    }

    fn image_base_url(&self) -> Option<Url> {
        self.image_base_url.clone()
    }
}

/// Resolves reference to commit object.
fn resolve_commit<'a>(repo: &'a gix::Repository, ref_name: &str) -> Result<gix::Commit<'a>> {
    repo.find_reference(ref_name)
        .with_context(|| format!("Failed to find reference: {}", ref_name))?
        .into_fully_peeled_id()
        .with_context(|| format!("Failed to peel reference '{}'", ref_name))?
        .object()
        .context("Failed to resolve object")?
        .try_into_commit()
        .map_err(|_| anyhow::anyhow!("Reference '{}' does not point to a commit", ref_name))
}

/// Reads blob content from repository at given reference and path.
///
/// # Arguments
///
/// * `repo`: Opened git repository
/// * `ref_name`: Reference name (branch/tag)
/// * `file_path`: Path to file within repository tree
///
/// # Returns
///
/// Blob content as bytes, or None when the path is absent from the tree
///
/// # Errors
///
/// Returns error if:
/// - Reference cannot be resolved
/// - Path names a tree or submodule rather than a blob
fn read_blob(
    repo: &gix::Repository,
    ref_name: &str,
    file_path: impl AsRef<Path>,
) -> Result<Option<Vec<u8>>> {
    let commit = resolve_commit(repo, ref_name)?;

    let mut tree = commit.tree().context("Failed to read commit tree")?;

    let Some(entry) = tree
        .peel_to_entry_by_path(file_path.as_ref())
        .context("Failed to traverse tree to path")?
    else {
        return Ok(None);
    };

    let object = entry.object().context("Failed to read tree entry object")?;

    let blob = object
        .try_into_blob()
        .map_err(|_| anyhow::anyhow!("Path is not a blob: {}", file_path.as_ref().display()))?;

    Ok(Some(blob.data.to_vec()))
}

/// Derives the blob base URL of a GitHub hosted repository.
///
/// Accepts scp-like (`git@github.com:owner/repo.git`), `https://`,
/// `http://`, `git://` and `ssh://` remote URLs. Returns
/// `https://github.com/owner/repo/blob/HEAD/` so relative readme links
/// point at the rendered files on the default branch.
pub fn github_base_url(remote: &str) -> Option<Url> {
    github_url(remote, "blob")
}

/// Derives the raw content base URL of a GitHub hosted repository.
///
/// Same remote forms as [`github_base_url`]; returns
/// `https://github.com/owner/repo/raw/HEAD/`, which serves file bytes and
/// so works as an image source.
pub fn github_raw_base_url(remote: &str) -> Option<Url> {
    github_url(remote, "raw")
}

fn github_url(remote: &str, view: &str) -> Option<Url> {
    let (owner, name) = github_owner_and_name(remote)?;
    Url::parse(&format!("https://github.com/{owner}/{name}/{view}/HEAD/")).ok()
}

fn github_owner_and_name(remote: &str) -> Option<(&str, &str)> {
    const PREFIXES: &[&str] = &[
        "git@github.com:",
        "ssh://git@github.com/",
        "https://github.com/",
        "http://github.com/",
        "git://github.com/",
    ];

    let remote = remote.trim();
    let lower = remote.to_ascii_lowercase();
    let rest = PREFIXES
        .iter()
        .find(|prefix| lower.starts_with(*prefix))
        .map(|prefix| &remote[prefix.len()..])?;

    let rest = rest.trim_end_matches('/');
    let rest = rest.strip_suffix(".git").unwrap_or(rest);

    let (owner, name) = rest.split_once('/')?;
    if owner.is_empty() || name.is_empty() || name.contains('/') {
        return None;
    }

    Some((owner, name))
}
