//! Command line configuration.

use anyhow::{Context, Result, bail};
use clap::Parser;
use std::path::PathBuf;
use url::Url;

use crate::manifest::DEFAULT_MANIFEST;
use crate::readme::ResolverOptions;

/// Command line configuration for pkgdoc.
#[derive(Debug, Clone, Parser)]
#[command(name = "pkgdoc", version, about, long_about = None)]
pub struct Config {
    /// Repository path
    #[arg(default_value = ".")]
    pub repo: PathBuf,

    /// Manifest file at the repository root
    #[arg(long, default_value = DEFAULT_MANIFEST)]
    pub manifest: String,

    /// Readme path, overriding the manifest hint
    #[arg(long)]
    pub readme: Option<String>,

    /// Base URL for relative readme links (defaults to the GitHub origin)
    #[arg(long)]
    pub base_url: Option<Url>,

    /// Base URL for relative readme images (defaults to --base-url, or raw
    /// content of the GitHub origin)
    #[arg(long)]
    pub image_base_url: Option<Url>,

    /// Keep a leading title heading in rendered markdown
    #[arg(long)]
    pub no_strip_title: bool,

    /// Print the whole package record as JSON
    #[arg(long)]
    pub json: bool,

    /// Write a standalone HTML preview page
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Open the preview page in a browser
    #[arg(long, requires = "output")]
    pub open: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Config {
    /// Parses configuration from command line arguments.
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Validates configuration.
    ///
    /// # Errors
    ///
    /// Returns error if repository path does not exist or the manifest name
    /// is blank.
    pub fn validate(&self) -> Result<()> {
        if !self.repo.exists() {
            bail!("Repository path does not exist: {}", self.repo.display());
        }

        if self.manifest.trim().is_empty() {
            bail!("Manifest file name must not be empty");
        }

        Ok(())
    }

    /// Returns package name fallback from the repository directory.
    ///
    /// # Errors
    ///
    /// Returns error if repository path has no name component or contains invalid UTF8.
    pub fn project_name(&self) -> Result<String> {
        let path = self
            .repo
            .canonicalize()
            .unwrap_or_else(|_| self.repo.clone());

        path.file_name()
            .and_then(|n| n.to_str())
            .with_context(|| format!("Cannot extract project name from path: {}", path.display()))
            .map(String::from)
    }

    /// Resolver options selected on the command line.
    pub fn resolver_options(&self) -> ResolverOptions {
        ResolverOptions {
            strip_title_heading: !self.no_strip_title,
            ..ResolverOptions::default()
        }
    }

    /// Default log filter for the chosen verbosity.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "pkgdoc=info",
            1 => "pkgdoc=debug",
            _ => "pkgdoc=trace",
        }
    }
}
