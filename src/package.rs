//! Canonical package record.

use serde::Serialize;
use std::collections::BTreeMap;

/// Dependency link to another package.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct PackageLink {
    /// Target package name
    pub target: String,
    /// Version constraint, copied verbatim from the manifest
    pub constraint: String,
}

impl PackageLink {
    /// Builds links from a manifest map, ordered by target name.
    pub fn from_map(map: &BTreeMap<String, String>) -> Vec<Self> {
        map.iter()
            .map(|(target, constraint)| Self {
                target: target.clone(),
                constraint: constraint.clone(),
            })
            .collect()
    }
}

/// Package state produced by an update cycle.
///
/// `readme` is either `None` or a sanitized HTML fragment; it never holds
/// raw markdown or unsanitized markup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PackageRecord {
    pub name: Option<String>,
    pub readme: Option<String>,
    pub requires: Vec<PackageLink>,
    pub dev_requires: Vec<PackageLink>,
    pub conflicts: Vec<PackageLink>,
    pub provides: Vec<PackageLink>,
    pub replaces: Vec<PackageLink>,
}

impl PackageRecord {
    /// Creates an empty record for the named package.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}
