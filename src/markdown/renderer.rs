//! Markdown rendering with GitHub Flavored Markdown support.

use anyhow::{Context, Result};
use comrak::Options;
use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;
use tracing::debug;

/// Renders markdown to an HTML fragment.
///
/// Provides GFM extensions including tables, strikethrough, autolinks,
/// task lists, footnotes, and description lists. Uses syntect for code
/// block syntax highlighting when language is specified. Raw HTML in the
/// source is emitted as is; callers sanitize the output separately.
pub struct MarkdownRenderer<'a> {
    options: Options<'a>,
    syntax_set: SyntaxSet,
}

impl<'a> MarkdownRenderer<'a> {
    /// Creates renderer with GitHub Flavored Markdown options.
    ///
    /// Configures all GFM extensions:
    /// - Tables, strikethrough, autolinks, task lists, footnotes
    /// - Punctuation kept as written (no smart quotes or dashes)
    /// - Raw HTML passthrough (sanitized downstream)
    /// - Syntax highlighting with syntect using CSS classes
    pub fn new() -> Self {
        let mut options = Options::default();

        // Extension options (GFM features)
        options.extension.strikethrough = true;
        options.extension.table = true;
        options.extension.autolink = true;
        options.extension.tasklist = true;
        options.extension.footnotes = true;
        options.extension.description_lists = true;

        // Raw HTML is kept; the sanitizer decides what survives
        options.render.unsafe_ = true;

        let syntax_set = SyntaxSet::load_defaults_newlines();

        Self {
            options,
            syntax_set,
        }
    }

    /// Renders markdown content to an HTML fragment.
    ///
    /// Parses markdown into AST and renders to HTML with GFM extensions.
    /// List openers are tightened so no whitespace separates `<ul>` or
    /// `<ol>` from the first `<li>`. Code blocks are syntax highlighted with
    /// CSS class names using syntect.
    ///
    /// Never fails: a code block that cannot be highlighted keeps its
    /// escaped plain text.
    ///
    /// # Arguments
    ///
    /// * `content`: Markdown content to render
    ///
    /// # Returns
    ///
    /// Rendered HTML fragment (no `<html>` or `<body>` wrapper)
    pub fn render(&self, content: &str) -> String {
        let html = comrak::markdown_to_html(content, &self.options);
        let html = tighten_list_openers(&html);

        self.highlight_code_blocks(&html)
    }

    /// Post-processes HTML to apply syntax highlighting with CSS classes.
    ///
    /// Finds code blocks with language-* classes from comrak's output and
    /// replaces the plain text content with syntect highlighted HTML using
    /// CSS class names (hljs-* prefix).
    ///
    /// # Arguments
    ///
    /// * `html`: Raw HTML from comrak with <code class="language-X"> blocks
    ///
    /// # Returns
    ///
    /// HTML with syntax highlighted code blocks using CSS classes
    fn highlight_code_blocks(&self, html: &str) -> String {
        let mut result = String::with_capacity(html.len());
        let mut last_end = 0;

        // Pattern: <code class="language-LANG">CODE</code>
        let mut search_pos = 0;

        while let Some(code_start) = html[search_pos..].find("<code class=\"language-") {
            let code_start = search_pos + code_start;

            let lang_start = code_start + "<code class=\"language-".len();
            let lang_end = match html[lang_start..].find('"') {
                Some(pos) => lang_start + pos,
                None => {
                    search_pos = code_start + 1;
                    continue;
                }
            };

            let language = &html[lang_start..lang_end];

            let content_start = match html[lang_end..].find('>') {
                Some(pos) => lang_end + pos + 1,
                None => {
                    search_pos = code_start + 1;
                    continue;
                }
            };

            let content_end = match html[content_start..].find("</code>") {
                Some(pos) => content_start + pos,
                None => {
                    search_pos = code_start + 1;
                    continue;
                }
            };

            let code_content = &html[content_start..content_end];

            // comrak escapes &, <, >, " inside code blocks
            let decoded_content = html_decode(code_content);

            let highlighted = match self.highlight_code(&decoded_content, language) {
                Ok(highlighted) => highlighted,
                Err(e) => {
                    debug!(language, error = %e, "code block left unhighlighted");
                    code_content.to_string()
                }
            };

            result.push_str(&html[last_end..code_start]);
            result.push_str("<code class=\"language-");
            result.push_str(language);
            result.push_str("\">");
            result.push_str(&highlighted);
            result.push_str("</code>");

            last_end = content_end + "</code>".len();
            search_pos = last_end;
        }

        result.push_str(&html[last_end..]);

        result
    }

    /// Highlights code with syntect using CSS classes.
    ///
    /// Uses ClassedHTMLGenerator to produce HTML with CSS class names
    /// instead of inline styles. The class prefix is "hljs-" to match
    /// highlight.js stylesheet conventions.
    ///
    /// # Errors
    ///
    /// Returns error if syntax highlighting fails
    fn highlight_code(&self, code: &str, language: &str) -> Result<String> {
        if code.is_empty() {
            return Ok(String::new());
        }

        let syntax = self
            .syntax_set
            .find_syntax_by_token(language)
            .or_else(|| self.syntax_set.find_syntax_by_extension(language));

        let Some(syntax) = syntax else {
            return Ok(html_escape(code));
        };

        let mut generator = ClassedHTMLGenerator::new_with_class_style(
            syntax,
            &self.syntax_set,
            ClassStyle::SpacedPrefixed { prefix: "hljs-" },
        );

        for line in LinesWithEndings::from(code) {
            generator
                .parse_html_for_line_which_includes_newline(line)
                .context("Failed to parse line for syntax highlighting")?;
        }

        Ok(generator.finalize())
    }
}

impl<'a> Default for MarkdownRenderer<'a> {
    fn default() -> Self {
        Self::new()
    }
}

/// Removes whitespace between list openers and their first item.
///
/// comrak emits `<ul>\n<li>`; stored readmes use `<ul><li>`. Only the gap
/// directly after an `<ul>`/`<ol>` start tag is touched.
fn tighten_list_openers(html: &str) -> String {
    let mut result = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(start) = find_list_opener(rest) {
        let Some(close) = rest[start..].find('>') else {
            break;
        };
        let tag_end = start + close + 1;
        result.push_str(&rest[..tag_end]);

        let after = &rest[tag_end..];
        let trimmed = after.trim_start();
        rest = if trimmed.starts_with("<li") {
            trimmed
        } else {
            after
        };
    }

    result.push_str(rest);
    result
}

/// Byte offset of the next `<ul>`/`<ol>` start tag.
fn find_list_opener(html: &str) -> Option<usize> {
    html.match_indices('<').map(|(i, _)| i).find(|&i| {
        let tag = html[i + 1..].as_bytes();
        tag.len() > 2
            && matches!(&tag[..2], b"ul" | b"ol")
            && matches!(tag[2], b'>' | b' ')
    })
}

/// Decodes the HTML entities comrak emits in code block content.
fn html_decode(html: &str) -> String {
    html.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Escapes HTML special characters.
fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_basic_markdown() {
        // Arrange
        let renderer = MarkdownRenderer::new();
        let markdown = "# Hello\n\nThis is **bold** text.";

        // Act
        let html = renderer.render(markdown);

        // Assert
        assert!(html.contains("<h1>"), "Should contain h1 tag");
        assert!(html.contains("Hello"), "Should contain heading text");
        assert!(html.contains("<strong>"), "Should contain strong tag");
        assert!(html.contains("bold"), "Should contain bold text");
    }

    #[test]
    fn test_render_paragraph() {
        // Arrange
        let renderer = MarkdownRenderer::new();

        // Act
        let html = renderer.render("This is the readme");

        // Assert
        assert_eq!(html, "<p>This is the readme</p>\n");
    }

    #[test]
    fn test_render_list_has_no_gap_after_opener() {
        // Arrange
        let renderer = MarkdownRenderer::new();
        let markdown = "# some package name\n\nWhy you should use this package:\n - it is easy to use\n - no overhead\n - minimal requirements\n";

        // Act
        let html = renderer.render(markdown);

        // Assert
        assert_eq!(
            html,
            "<h1>some package name</h1>\n\
             <p>Why you should use this package:</p>\n\
             <ul><li>it is easy to use</li>\n\
             <li>no overhead</li>\n\
             <li>minimal requirements</li>\n\
             </ul>\n"
        );
    }

    #[test]
    fn test_render_all_bullet_markers() {
        // Arrange
        let renderer = MarkdownRenderer::new();

        // Act
        let dash = renderer.render("- one\n- two\n");
        let star = renderer.render("* one\n* two\n");
        let plus = renderer.render("+ one\n+ two\n");

        // Assert
        for html in [&dash, &star, &plus] {
            assert!(
                html.starts_with("<ul><li>one</li>"),
                "Every bullet marker should render a tight list: {}",
                html
            );
        }
    }

    #[test]
    fn test_render_ordered_list_with_start() {
        // Arrange
        let renderer = MarkdownRenderer::new();

        // Act
        let html = renderer.render("3. three\n4. four\n");

        // Assert
        assert!(
            html.starts_with("<ol start=\"3\"><li>three</li>"),
            "Ordered list opener should keep attributes: {}",
            html
        );
    }

    #[test]
    fn test_render_gfm_tables() {
        // Arrange
        let renderer = MarkdownRenderer::new();
        let markdown = r#"
| Header 1 | Header 2 |
|----------|----------|
| Cell 1   | Cell 2   |
"#;

        // Act
        let html = renderer.render(markdown);

        // Assert
        assert!(html.contains("<table>"), "Should contain table tag");
        assert!(html.contains("<th>"), "Should contain table header");
        assert!(html.contains("Header 1"), "Should contain header text");
        assert!(html.contains("<td>"), "Should contain table cell");
        assert!(html.contains("Cell 1"), "Should contain cell text");
    }

    #[test]
    fn test_render_gfm_strikethrough() {
        // Arrange
        let renderer = MarkdownRenderer::new();

        // Act
        let html = renderer.render("This is ~~strikethrough~~ text.");

        // Assert
        assert!(
            html.contains("<del>") || html.contains("<s>"),
            "Should contain strikethrough tag: {}",
            html
        );
    }

    #[test]
    fn test_render_gfm_tasklist() {
        // Arrange
        let renderer = MarkdownRenderer::new();
        let markdown = "- [ ] Unchecked task\n- [x] Checked task\n";

        // Act
        let html = renderer.render(markdown);

        // Assert
        assert!(
            html.contains("type=\"checkbox\""),
            "Should contain checkbox"
        );
        assert!(html.contains("disabled"), "Checkboxes should be disabled");
    }

    #[test]
    fn test_render_code_blocks() {
        // Arrange
        let renderer = MarkdownRenderer::new();
        let markdown = "```rust\nfn main() {\n    println!(\"hello\");\n}\n```\n";

        // Act
        let html = renderer.render(markdown);

        // Assert
        assert!(html.contains("<pre>"), "Should contain pre tag: {}", html);
        assert!(
            html.contains("<code class=\"language-rust\">"),
            "Should contain code tag with language class: {}",
            html
        );
        assert!(
            html.contains("<span class=\"hljs-"),
            "Should contain syntax highlighting spans: {}",
            html
        );
        assert!(html.contains("println!"), "Should contain 'println!' macro");
    }

    #[test]
    fn test_render_html_passthrough() {
        // Arrange
        let renderer = MarkdownRenderer::new();
        let markdown = "<script>alert('xss')</script>\n\nNormal text.";

        // Act
        let html = renderer.render(markdown);

        // Assert: raw HTML survives rendering, sanitizing is a later pass
        assert!(
            html.contains("<script>"),
            "Should pass through raw HTML: {}",
            html
        );
        assert!(html.contains("Normal text"), "Should contain safe text");
    }

    #[test]
    fn test_render_autolinks() {
        // Arrange
        let renderer = MarkdownRenderer::new();

        // Act
        let html = renderer.render("Visit https://example.com for more info.");

        // Assert
        assert!(
            html.contains("<a href=\"https://example.com\">"),
            "Should link bare URL: {}",
            html
        );
    }

    #[test]
    fn test_render_keeps_punctuation_verbatim() {
        // Arrange
        let renderer = MarkdownRenderer::new();

        // Act
        let html = renderer.render("Run composer require --dev x -- \"quoted\" it's done...");

        // Assert
        assert_eq!(
            html,
            "<p>Run composer require --dev x -- &quot;quoted&quot; it's done...</p>\n"
        );
    }

    #[test]
    fn test_render_empty_markdown() {
        // Arrange
        let renderer = MarkdownRenderer::new();

        // Act
        let html = renderer.render("");

        // Assert
        assert!(html.is_empty(), "Empty markdown should render nothing");
    }

    #[test]
    fn test_render_blockquotes() {
        // Arrange
        let renderer = MarkdownRenderer::new();

        // Act
        let html = renderer.render("> This is a quote\n> Second line");

        // Assert
        assert!(
            html.contains("<blockquote>"),
            "Should contain blockquote tag"
        );
        assert!(
            html.contains("This is a quote"),
            "Should contain quote text"
        );
    }

    #[test]
    fn test_highlight_code_blocks_unknown_language() {
        // Arrange
        let renderer = MarkdownRenderer::new();
        let markdown = "```unknownlang\nsome <code>\n```\n";

        // Act
        let html = renderer.render(markdown);

        // Assert
        assert!(
            html.contains("some &lt;code&gt;"),
            "Should keep escaped plain text for unknown language: {}",
            html
        );
        assert!(
            html.contains("<code class=\"language-unknownlang\">"),
            "Should preserve language class"
        );
    }

    #[test]
    fn test_code_block_list_markup_is_not_tightened() {
        // Arrange
        let renderer = MarkdownRenderer::new();
        let markdown = "```\n<ul>\n  <li>x</li>\n</ul>\n```\n";

        // Act
        let html = renderer.render(markdown);

        // Assert
        assert!(
            html.contains("&lt;ul&gt;\n  &lt;li&gt;"),
            "Escaped markup inside code must be untouched: {}",
            html
        );
    }

    #[test]
    fn test_tighten_list_openers_leaves_other_tags() {
        // Arrange
        let html = "<ul>\n<li>a</li>\n</ul>\n<ulx>\n<li>b</li>\n<ol>\n\n<li>c</li></ol>";

        // Act
        let tightened = tighten_list_openers(html);

        // Assert
        assert_eq!(
            tightened,
            "<ul><li>a</li>\n</ul>\n<ulx>\n<li>b</li>\n<ol><li>c</li></ol>"
        );
    }

    #[test]
    fn test_html_decode_reverses_escape() {
        // Arrange
        let text = "a < b && \"c\" > 'd'";

        // Act
        let round = html_decode(&html_escape(text));

        // Assert
        assert_eq!(round, text);
    }
}
