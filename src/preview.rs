//! Standalone readme preview page.

use maud::{DOCTYPE, Markup, PreEscaped, html};

use crate::package::{PackageLink, PackageRecord};

const PREVIEW_CSS: &str = "body{font-family:system-ui,sans-serif;max-width:56rem;margin:2rem auto;padding:0 1rem;line-height:1.5}\
pre{background:#f6f8fa;padding:1rem;overflow:auto}\
table{border-collapse:collapse}td,th{border:1px solid #d0d7de;padding:.25rem .5rem}\
.links{font-size:.9rem;color:#57606a}";

/// Renders a package record as a complete HTML document.
///
/// The readme is embedded without escaping; it is a sanitized fragment
/// by construction of [`PackageRecord`].
///
/// # Arguments
///
/// * `record`: Updated package record
///
/// # Returns
///
/// Complete HTML document
pub fn preview_page(record: &PackageRecord) -> Markup {
    let title = record.name.as_deref().unwrap_or("package");

    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) " - readme" }
                style { (PreEscaped(PREVIEW_CSS)) }
            }
            body {
                header {
                    h1 { (title) }
                    (link_list("Requires", &record.requires))
                    (link_list("Requires (dev)", &record.dev_requires))
                    (link_list("Conflicts", &record.conflicts))
                    (link_list("Provides", &record.provides))
                    (link_list("Replaces", &record.replaces))
                }
                article class="readme" {
                    @if let Some(readme) = &record.readme {
                        (PreEscaped(readme))
                    } @else {
                        p { em { "This package has no readme." } }
                    }
                }
            }
        }
    }
}

fn link_list(label: &str, links: &[PackageLink]) -> Markup {
    html! {
        @if !links.is_empty() {
            p class="links" {
                strong { (label) ": " }
                @for (i, link) in links.iter().enumerate() {
                    @if i > 0 { ", " }
                    code { (link.target) " " (link.constraint) }
                }
            }
        }
    }
}
