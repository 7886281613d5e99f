//! Package update cycle.

use tracing::{info, instrument};

use crate::manifest::ManifestInfo;
use crate::package::{PackageLink, PackageRecord};
use crate::readme::ReadmeResolver;
use crate::repository::RepositoryHandle;

/// Refreshes a package record from its manifest and repository.
///
/// Link lists are copied verbatim from the manifest. The readme is
/// resolved through `resolver` and always overwrites the previous value,
/// so a readme removed upstream clears the stored one. A missing or
/// unreadable readme never fails the update.
///
/// # Arguments
///
/// * `record`: Package record to update in place
/// * `manifest`: Manifest read from the repository's root identifier
/// * `repo`: Repository the readme is fetched from
/// * `resolver`: Readme pipeline
#[instrument(skip_all, fields(package = record.name.as_deref().or(manifest.name.as_deref())))]
pub fn update_package(
    record: &mut PackageRecord,
    manifest: &ManifestInfo,
    repo: &dyn RepositoryHandle,
    resolver: &ReadmeResolver<'_>,
) {
    if record.name.is_none() {
        record.name = manifest.name.clone();
    }

    record.requires = PackageLink::from_map(&manifest.require);
    record.dev_requires = PackageLink::from_map(&manifest.require_dev);
    record.conflicts = PackageLink::from_map(&manifest.conflict);
    record.provides = PackageLink::from_map(&manifest.provide);
    record.replaces = PackageLink::from_map(&manifest.replace);

    record.readme = resolver.resolve(manifest, repo);

    info!(
        requires = record.requires.len(),
        readme = record.readme.is_some(),
        "package updated"
    );
}
