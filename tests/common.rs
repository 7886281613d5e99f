//! Shared test utilities for integration tests.
//!
//! Provides helper functions for creating temporary git repositories and
//! performing common git operations used across multiple test files.

#![allow(dead_code)]

use anyhow::Result;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

/// Runs a git command in the repository, failing on non-zero exit.
fn git(repo_path: &Path, args: &[&str]) -> Result<String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(repo_path)
        .output()?;

    if !output.status.success() {
        anyhow::bail!(
            "git {} failed: {}",
            args.join(" "),
            String::from_utf8_lossy(&output.stderr)
        );
    }

    Ok(String::from_utf8(output.stdout)?.trim().to_string())
}

/// Creates temporary git repository with test configuration.
///
/// Sets up a clean git repository on branch `master` with user name and
/// email configured and commit signing disabled.
///
/// # Errors
///
/// Returns error if git commands fail or directory creation fails
pub fn create_test_repo() -> Result<TempDir> {
    let dir = TempDir::new()?;
    let path = dir.path();

    git(path, &["init", "--quiet"])?;
    git(path, &["symbolic-ref", "HEAD", "refs/heads/master"])?;
    git(path, &["config", "user.name", "Test User"])?;
    git(path, &["config", "user.email", "test@example.com"])?;
    git(path, &["config", "commit.gpgsign", "false"])?;

    Ok(dir)
}

/// Creates a repository with the given files committed on `master`.
///
/// # Errors
///
/// Returns error if writing, staging or committing fails
pub fn create_repo_with_files(files: &[(&str, &str)]) -> Result<TempDir> {
    let dir = create_test_repo()?;
    for (path, content) in files {
        write_file(dir.path(), path, content)?;
    }
    git_add(dir.path(), &["."])?;
    git_commit(dir.path(), "Initial commit")?;
    Ok(dir)
}

/// Commits staged changes and returns commit hash.
///
/// # Errors
///
/// Returns error if commit fails or hash cannot be retrieved
pub fn git_commit(repo_path: &Path, message: &str) -> Result<String> {
    git(repo_path, &["commit", "--quiet", "-m", message])?;
    git(repo_path, &["rev-parse", "HEAD"])
}

/// Stages files in repository.
///
/// # Errors
///
/// Returns error if git add fails
pub fn git_add(repo_path: &Path, files: &[&str]) -> Result<()> {
    let mut args = vec!["add"];
    args.extend_from_slice(files);
    git(repo_path, &args).map(|_| ())
}

/// Registers an `origin` remote.
///
/// # Errors
///
/// Returns error if git remote fails
pub fn git_remote_origin(repo_path: &Path, url: &str) -> Result<()> {
    git(repo_path, &["remote", "add", "origin", url]).map(|_| ())
}

/// Creates and switches to a new branch.
///
/// # Errors
///
/// Returns error if git checkout fails
pub fn git_checkout_new(repo_path: &Path, branch: &str) -> Result<()> {
    git(repo_path, &["checkout", "--quiet", "-b", branch]).map(|_| ())
}

/// Writes file to repository, creating parent directories as needed.
///
/// # Errors
///
/// Returns error if directory creation or file write fails
pub fn write_file(repo_path: &Path, path: &str, content: &str) -> Result<()> {
    let file_path = repo_path.join(path);
    if let Some(parent) = file_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(file_path, content)?;
    Ok(())
}
