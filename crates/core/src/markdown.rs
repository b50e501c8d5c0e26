//! HTML to Markdown conversion for post bodies.
//!
//! Conversion is done by `htmd`. Block-editor markers are removed from the
//! HTML before conversion so they never split lists or quotes. Every other
//! comment, the `<!-- more -->` page break included, is carried through the
//! conversion verbatim.

use htmd::HtmlToMarkdown;
use lol_html::html_content::ContentType;
use lol_html::{HtmlRewriter, Settings, doc_comments};

use crate::markers::is_marker_comment;
use crate::{Result, WpImportError};

const PLACEHOLDER_START: char = '\u{E000}';
const PLACEHOLDER_END: char = '\u{E001}';

/// Configuration for Markdown conversion
#[derive(Debug, Clone)]
pub struct MarkdownConfig {
    /// Keep HTML comments in the Markdown output
    pub preserve_comments: bool,
    /// Drop `<!-- wp:... -->` markers even when comments are preserved
    pub drop_block_markers: bool,
    /// Tags dropped together with their content
    pub skip_tags: Vec<&'static str>,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self { preserve_comments: true, drop_block_markers: true, skip_tags: vec!["script", "style"] }
    }
}

/// Convert a post body to Markdown with the default configuration
pub fn convert_to_markdown(html: &str) -> Result<String> {
    MarkdownFormatter::new(MarkdownConfig::default()).convert(html)
}

/// Markdown formatter with configurable options
pub struct MarkdownFormatter {
    config: MarkdownConfig,
    converter: HtmlToMarkdown,
}

impl MarkdownFormatter {
    pub fn new(config: MarkdownConfig) -> Self {
        let converter = HtmlToMarkdown::builder().skip_tags(config.skip_tags.clone()).build();
        Self { config, converter }
    }

    /// Converts `html` to Markdown.
    ///
    /// # Errors
    ///
    /// Returns [`WpImportError::ConversionError`] when the markup cannot be
    /// rewritten or converted.
    pub fn convert(&self, html: &str) -> Result<String> {
        if !self.config.preserve_comments {
            return self.html_to_markdown(html);
        }

        let shielded = Shielded::new(html, self.config.drop_block_markers)?;
        let markdown = self.html_to_markdown(&shielded.html)?;
        Ok(shielded.restore(markdown))
    }

    fn html_to_markdown(&self, html: &str) -> Result<String> {
        self.converter
            .convert(html)
            .map_err(|e| WpImportError::ConversionError(e.to_string()))
    }
}

/// HTML with its kept comments swapped for private-use placeholders the
/// converter passes through as text.
struct Shielded {
    html: String,
    /// Never occurs in the input, so restoring cannot touch post text.
    prefix: String,
    comments: Vec<String>,
}

impl Shielded {
    fn new(html: &str, drop_block_markers: bool) -> Result<Self> {
        let prefix = unused_prefix(html);
        let mut output = Vec::new();
        let mut comments = Vec::new();

        let mut rewriter = HtmlRewriter::new(
            Settings {
                document_content_handlers: vec![doc_comments!(|comment| {
                    let text = comment.text();
                    if drop_block_markers && is_marker_comment(&text) {
                        comment.remove();
                    } else {
                        let marker = placeholder(&prefix, comments.len());
                        comments.push(text);
                        comment.replace(&marker, ContentType::Text);
                    }
                    Ok(())
                })],
                ..Default::default()
            },
            |c: &[u8]| output.extend_from_slice(c),
        );

        rewriter
            .write(html.as_bytes())
            .map_err(|e| WpImportError::ConversionError(e.to_string()))?;
        rewriter.end().map_err(|e| WpImportError::ConversionError(e.to_string()))?;

        let html = String::from_utf8(output).map_err(|e| WpImportError::ConversionError(e.to_string()))?;
        Ok(Self { html, prefix, comments })
    }

    fn restore(&self, mut markdown: String) -> String {
        for (index, text) in self.comments.iter().enumerate() {
            markdown = markdown.replace(&placeholder(&self.prefix, index), &format!("<!--{}-->", text));
        }
        markdown
    }
}

/// First `\u{E000}<n>:` that does not already appear in `html`.
fn unused_prefix(html: &str) -> String {
    let mut n = 0usize;
    loop {
        let prefix = format!("{}{}:", PLACEHOLDER_START, n);
        if !html.contains(&prefix) {
            return prefix;
        }
        n += 1;
    }
}

fn placeholder(prefix: &str, index: usize) -> String {
    format!("{}{}{}", prefix, index, PLACEHOLDER_END)
}
