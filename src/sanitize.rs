//! HTML sanitizing for rendered readmes.
//!
//! Filters HTML against an allow-list table ([`SanitizePolicy`]) using
//! ammonia, strips script carriers, and rewrites relative links against a
//! repository base URL. Parsing follows the HTML5 algorithm, so malformed
//! input is repaired rather than rejected.

mod links;
mod policy;

pub use links::LinkResolver;
pub use policy::SanitizePolicy;

use ammonia::{Builder, UrlRelative, UrlRelativeEvaluate};
use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use url::Url;

/// Applies a [`SanitizePolicy`] to HTML fragments.
#[derive(Debug, Clone, Default)]
pub struct Sanitizer {
    policy: SanitizePolicy,
}

impl Sanitizer {
    /// Creates sanitizer for the given policy.
    pub fn new(policy: SanitizePolicy) -> Self {
        Self { policy }
    }

    /// Policy in effect.
    pub fn policy(&self) -> &SanitizePolicy {
        &self.policy
    }

    /// Sanitizes an HTML fragment.
    ///
    /// Disallowed elements are unwrapped and their text kept, except
    /// `script`/`style` style elements which vanish with their content.
    /// Disallowed attributes, comments and URLs with schemes outside the
    /// policy are dropped. Relative URLs resolve against `base_url` when
    /// given and pass through otherwise.
    ///
    /// Sanitizing already sanitized output returns it unchanged.
    ///
    /// # Arguments
    ///
    /// * `html`: HTML fragment, possibly malformed
    /// * `base_url`: Absolute URL relative links and images resolve against
    pub fn sanitize(&self, html: &str, base_url: Option<&Url>) -> String {
        self.sanitize_with_image_base(html, base_url, base_url)
    }

    /// Sanitizes an HTML fragment, resolving image sources separately.
    ///
    /// Hosts often serve rendered file pages and raw file content under
    /// different URLs; relative `img src` values resolve against
    /// `image_base_url` while every other URL uses `base_url`.
    ///
    /// # Arguments
    ///
    /// * `html`: HTML fragment, possibly malformed
    /// * `base_url`: Absolute URL relative links resolve against
    /// * `image_base_url`: Absolute URL relative image sources resolve against
    pub fn sanitize_with_image_base(
        &self,
        html: &str,
        base_url: Option<&Url>,
        image_base_url: Option<&Url>,
    ) -> String {
        let mut builder = self.builder(base_url);

        if let Some(image_base) = image_base_url {
            let images = LinkResolver::new(Some(image_base.clone()), None);
            builder.attribute_filter(move |element, attribute, value| match (element, attribute) {
                ("img", "src") if is_relative(value) => images.evaluate(value),
                _ => Some(Cow::Borrowed(value)),
            });
        }

        builder.clean(html).to_string()
    }

    fn builder(&self, base_url: Option<&Url>) -> Builder<'static> {
        let policy = &self.policy;
        let resolver = LinkResolver::new(base_url.cloned(), policy.id_prefix);

        let tag_attributes: HashMap<&'static str, HashSet<&'static str>> = policy
            .tag_attributes
            .iter()
            .map(|(tag, attributes)| (*tag, attributes.iter().copied().collect()))
            .collect();

        let mut tag_attribute_values: HashMap<&'static str, HashMap<&'static str, HashSet<&'static str>>> =
            HashMap::new();
        for (tag, attribute, values) in policy.tag_attribute_values {
            tag_attribute_values
                .entry(*tag)
                .or_default()
                .insert(*attribute, values.iter().copied().collect());
        }

        let mut builder = Builder::empty();
        builder
            .tags(policy.tags.iter().copied().collect())
            .clean_content_tags(policy.clean_content_tags.iter().copied().collect())
            .generic_attributes(HashSet::new())
            .tag_attributes(tag_attributes)
            .tag_attribute_values(tag_attribute_values)
            .url_schemes(policy.url_schemes.iter().copied().collect())
            .url_relative(UrlRelative::Custom(Box::new(resolver)))
            .link_rel(policy.link_rel)
            .id_prefix(policy.id_prefix)
            .strip_comments(true);
        builder
    }
}

/// Whether `url` needs a base to be resolved.
fn is_relative(url: &str) -> bool {
    matches!(Url::parse(url), Err(url::ParseError::RelativeUrlWithoutBase))
}
