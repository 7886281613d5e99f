//! Markdown rendering with GitHub Flavored Markdown support.
//!
//! This module renders readme markdown using comrak with GFM extensions
//! (tables, strikethrough, autolinks, task lists). Output is an unsanitized
//! HTML fragment; raw HTML in the source passes through untouched.

mod renderer;

pub use renderer::MarkdownRenderer;
