use anyhow::{Context, Result};
use pkgdoc::{Config, GitRepository, PackageRecord, ReadmeResolver};
use std::fs;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Installs the stderr log subscriber; `RUST_LOG` overrides the verbosity flag.
fn init_tracing(config: &Config) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.log_filter()));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let config = Config::parse();
    init_tracing(&config);
    config.validate().context("Invalid configuration")?;

    let repo = GitRepository::open(&config.repo)
        .context("Failed to open repository")?
        .with_base_url(config.base_url.clone())
        .with_image_base_url(config.image_base_url.clone());

    let mut manifest = pkgdoc::load_manifest(&repo, &config.manifest)
        .context("Failed to load package manifest")?;
    if let Some(readme) = &config.readme {
        manifest.readme = Some(readme.clone());
    }

    let mut record = PackageRecord::default();
    if manifest.name.is_none() {
        record.name = Some(config.project_name()?);
    }

    let resolver = ReadmeResolver::with_options(config.resolver_options());
    pkgdoc::update_package(&mut record, &manifest, &repo, &resolver);

    if let Some(output) = &config.output {
        let page = pkgdoc::preview_page(&record);
        fs::write(output, page.into_string())
            .with_context(|| format!("Failed to write {}", output.display()))?;
        info!(path = %output.display(), "wrote preview page");

        if config.open {
            open::that(output)
                .with_context(|| format!("Failed to open {}", output.display()))?;
        }
        return Ok(());
    }

    if config.json {
        let json = serde_json::to_string_pretty(&record).context("Failed to serialize record")?;
        println!("{}", json);
        return Ok(());
    }

    match &record.readme {
        Some(readme) => println!("{}", readme),
        None => warn!(repo = %config.repo.display(), "no readme available"),
    }

    Ok(())
}
