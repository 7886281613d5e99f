//! Allow-list tables for readme sanitizing.

/// Tag and attribute allow-list applied by the sanitizer.
///
/// Everything not listed here is removed: disallowed tags are unwrapped
/// (their text kept), `clean_content_tags` are dropped together with their
/// content, disallowed attributes are stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizePolicy {
    /// Elements kept in the output.
    pub tags: &'static [&'static str],
    /// Elements removed along with everything inside them.
    pub clean_content_tags: &'static [&'static str],
    /// Attributes kept per element.
    pub tag_attributes: &'static [(&'static str, &'static [&'static str])],
    /// Attributes kept per element only when their value is listed.
    pub tag_attribute_values: &'static [(&'static str, &'static str, &'static [&'static str])],
    /// URL schemes allowed in `href` and `src`.
    pub url_schemes: &'static [&'static str],
    /// `rel` value forced onto every link.
    pub link_rel: Option<&'static str>,
    /// Prefix applied to `id` attributes and to fragment-only links.
    pub id_prefix: Option<&'static str>,
}

impl SanitizePolicy {
    /// Conservative policy for third-party readmes.
    pub const fn readme() -> Self {
        Self {
            tags: &[
                "p", "br", "hr", "small", "strong", "b", "em", "i", "strike", "s", "sub", "sup",
                "ins", "del", "ol", "ul", "li", "h1", "h2", "h3", "h4", "h5", "h6", "dl", "dd",
                "dt", "pre", "code", "samp", "kbd", "q", "blockquote", "abbr", "cite", "table",
                "thead", "tbody", "tfoot", "th", "tr", "td", "a", "span", "img", "input",
                "details", "summary",
            ],
            clean_content_tags: &["script", "style"],
            tag_attributes: &[
                ("a", &["href", "title", "id"]),
                ("img", &["src", "alt", "title", "width", "height"]),
                ("td", &["colspan", "rowspan", "align"]),
                ("th", &["colspan", "rowspan", "align"]),
                ("code", &["class"]),
                ("span", &["class"]),
                ("pre", &["class"]),
                ("input", &["checked", "disabled"]),
                ("abbr", &["title"]),
                ("ol", &["start"]),
                ("sup", &["id", "class"]),
                ("li", &["id"]),
            ],
            tag_attribute_values: &[("input", "type", &["checkbox"])],
            url_schemes: &["http", "https", "mailto"],
            link_rel: Some("nofollow noindex noopener external ugc"),
            id_prefix: Some("user-content-"),
        }
    }

    /// Attributes allowed on `tag`.
    pub fn attributes_for(&self, tag: &str) -> &'static [&'static str] {
        self.tag_attributes
            .iter()
            .find(|(name, _)| *name == tag)
            .map(|(_, attributes)| *attributes)
            .unwrap_or(&[])
    }
}

impl Default for SanitizePolicy {
    fn default() -> Self {
        Self::readme()
    }
}
