//! WordPress eXtended RSS (WXR) parsing.
//!
//! A WXR export is an RSS 2.0 document with WordPress-specific elements in
//! the `wp:` namespace. This module reads one into [`Channel`] and [`Item`]
//! records using XPath queries over an `sxd_document` tree.
//!
//! WordPress has shipped several namespace URIs for the `wp:` prefix
//! (`export/1.0/` through `export/1.2/`), so WordPress fields are matched by
//! local name only.
//!
//! # Example
//!
//! ```rust
//! use wpimport_core::wxr::{PostType, parse_wxr};
//!
//! let xml = r#"<?xml version="1.0"?>
//! <rss version="2.0" xmlns:wp="http://wordpress.org/export/1.2/"
//!      xmlns:content="http://purl.org/rss/1.0/modules/content/">
//!   <channel>
//!     <title>My Blog</title>
//!     <language>en-US</language>
//!     <item>
//!       <title>Hello</title>
//!       <content:encoded><![CDATA[<p>Hi</p>]]></content:encoded>
//!       <wp:post_type>post</wp:post_type>
//!     </item>
//!   </channel>
//! </rss>"#;
//!
//! let channels = parse_wxr(xml.as_bytes()).unwrap();
//! assert_eq!(channels[0].items[0].post_type, PostType::Post);
//! ```

use sxd_document::parser;
use sxd_xpath::nodeset::Node;
use sxd_xpath::{Context, Factory, Value, XPath};
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

use crate::{Result, WpImportError};

const CONTENT_NS: &str = "http://purl.org/rss/1.0/modules/content/";

/// Category domain WordPress uses for tags.
pub const TAG_DOMAIN: &str = "post_tag";

/// One blog within an export.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Channel {
    pub title: String,
    pub link: String,
    pub description: String,
    /// Language code as exported, e.g. `en-US`.
    pub language: String,
    pub items: Vec<Item>,
}

/// One exported WordPress record: a post, page, attachment, menu item, etc.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub title: String,
    /// `wp:post_name`; empty when WordPress never assigned one.
    pub slug: String,
    /// Raw `content:encoded` body, block-editor comments included.
    pub content: String,
    /// Publication time in UTC, if the export carried a usable date.
    pub published: Option<OffsetDateTime>,
    pub post_type: PostType,
    /// `wp:status` (`publish`, `draft`, `private`, ...).
    pub status: String,
    pub categories: Vec<Category>,
}

/// Kind of WordPress record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PostType {
    Post,
    Page,
    Attachment,
    /// Revisions, navigation menu items, custom post types.
    Other(String),
}

impl PostType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Post => "post",
            Self::Page => "page",
            Self::Attachment => "attachment",
            Self::Other(kind) => kind,
        }
    }
}

impl From<&str> for PostType {
    fn from(s: &str) -> Self {
        match s.trim() {
            "post" => Self::Post,
            "page" => Self::Page,
            "attachment" => Self::Attachment,
            other => Self::Other(other.to_string()),
        }
    }
}

/// A category or tag assignment on an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    /// `category`, `post_tag`, or a custom taxonomy.
    pub domain: String,
    pub nicename: String,
    /// Display name.
    pub name: String,
}

impl Category {
    pub fn is_tag(&self) -> bool {
        self.domain == TAG_DOMAIN
    }
}

/// Compiled XPath queries for reading WXR documents.
pub struct WxrParser {
    channels: XPath,
    items: XPath,
    categories: XPath,
    title: XPath,
    link: XPath,
    description: XPath,
    language: XPath,
    slug: XPath,
    content: XPath,
    post_type: XPath,
    status: XPath,
    date_gmt: XPath,
    date_local: XPath,
}

impl WxrParser {
    pub fn new() -> Result<Self> {
        let factory = Factory::new();
        let content = format!("string(*[local-name()='encoded' and namespace-uri()='{}'])", CONTENT_NS);

        Ok(Self {
            channels: compile(&factory, "/rss/channel")?,
            items: compile(&factory, "item")?,
            categories: compile(&factory, "category")?,
            title: compile(&factory, "string(title)")?,
            link: compile(&factory, "string(link)")?,
            description: compile(&factory, "string(description)")?,
            language: compile(&factory, "string(language)")?,
            slug: compile(&factory, "string(*[local-name()='post_name'])")?,
            content: compile(&factory, &content)?,
            post_type: compile(&factory, "string(*[local-name()='post_type'])")?,
            status: compile(&factory, "string(*[local-name()='status'])")?,
            date_gmt: compile(&factory, "string(*[local-name()='post_date_gmt'])")?,
            date_local: compile(&factory, "string(*[local-name()='post_date'])")?,
        })
    }

    /// Parses raw export bytes into channels, in document order.
    ///
    /// # Errors
    ///
    /// [`WpImportError::InvalidEncoding`] for non-UTF-8 input and
    /// [`WpImportError::ParseError`] for malformed XML or a document without
    /// an `<rss>` root.
    pub fn parse(&self, raw: &[u8]) -> Result<Vec<Channel>> {
        let text = std::str::from_utf8(raw).map_err(|_| WpImportError::InvalidEncoding)?;
        let text = text.trim_start_matches('\u{feff}');

        let package = parser::parse(text).map_err(|e| WpImportError::ParseError(e.to_string()))?;
        let document = package.as_document();
        let context = Context::new();

        let is_rss = document
            .root()
            .children()
            .into_iter()
            .filter_map(|child| child.element())
            .any(|el| el.name().local_part() == "rss");
        if !is_rss {
            return Err(WpImportError::ParseError("document root is not <rss>".to_string()));
        }

        let mut channels = Vec::new();
        for node in self.nodes(&self.channels, &context, document.root().into())? {
            channels.push(self.read_channel(&context, node)?);
        }

        Ok(channels)
    }

    fn read_channel<'d>(&self, context: &Context<'d>, node: Node<'d>) -> Result<Channel> {
        let mut items = Vec::new();
        for item in self.nodes(&self.items, context, node)? {
            items.push(self.read_item(context, item)?);
        }

        Ok(Channel {
            title: self.string(&self.title, context, node)?,
            link: self.string(&self.link, context, node)?,
            description: self.string(&self.description, context, node)?,
            language: self.string(&self.language, context, node)?,
            items,
        })
    }

    fn read_item<'d>(&self, context: &Context<'d>, node: Node<'d>) -> Result<Item> {
        let published = match parse_wxr_date(&self.string(&self.date_gmt, context, node)?) {
            Some(date) => Some(date),
            None => parse_wxr_date(&self.string(&self.date_local, context, node)?),
        };

        let categories = self
            .nodes(&self.categories, context, node)?
            .into_iter()
            .filter_map(|cat| {
                let el = cat.element()?;
                Some(Category {
                    domain: el.attribute_value("domain").unwrap_or_default().to_string(),
                    nicename: el.attribute_value("nicename").unwrap_or_default().to_string(),
                    name: cat.string_value().trim().to_string(),
                })
            })
            .collect();

        Ok(Item {
            title: self.string(&self.title, context, node)?,
            slug: self.string(&self.slug, context, node)?.trim().to_string(),
            content: self.string(&self.content, context, node)?,
            published,
            post_type: PostType::from(self.string(&self.post_type, context, node)?.as_str()),
            status: self.string(&self.status, context, node)?.trim().to_string(),
            categories,
        })
    }

    fn nodes<'d>(&self, xpath: &XPath, context: &Context<'d>, node: Node<'d>) -> Result<Vec<Node<'d>>> {
        match evaluate(xpath, context, node)? {
            Value::Nodeset(nodeset) => Ok(nodeset.document_order()),
            _ => Ok(Vec::new()),
        }
    }

    fn string<'d>(&self, xpath: &XPath, context: &Context<'d>, node: Node<'d>) -> Result<String> {
        match evaluate(xpath, context, node)? {
            Value::String(s) => Ok(s),
            Value::Nodeset(nodeset) => Ok(nodeset
                .document_order()
                .first()
                .map(|n| n.string_value())
                .unwrap_or_default()),
            Value::Boolean(_) | Value::Number(_) => Ok(String::new()),
        }
    }
}

/// Parses an export with a freshly compiled [`WxrParser`].
pub fn parse_wxr(raw: &[u8]) -> Result<Vec<Channel>> {
    WxrParser::new()?.parse(raw)
}

/// Parses a `wp:post_date_gmt` value (`YYYY-MM-DD HH:MM:SS`) as UTC.
///
/// WordPress writes `0000-00-00 00:00:00` for unpublished drafts; that and
/// any other unparseable value yields `None`.
pub fn parse_wxr_date(value: &str) -> Option<OffsetDateTime> {
    let format = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    PrimitiveDateTime::parse(value.trim(), format)
        .ok()
        .map(PrimitiveDateTime::assume_utc)
}

fn compile(factory: &Factory, expr: &str) -> Result<XPath> {
    factory
        .build(expr)
        .map_err(|e| WpImportError::ParseError(format!("Invalid XPath '{}': {}", expr, e)))?
        .ok_or_else(|| WpImportError::ParseError(format!("Invalid XPath: {}", expr)))
}

fn evaluate<'d>(xpath: &XPath, context: &Context<'d>, node: Node<'d>) -> Result<Value<'d>> {
    xpath
        .evaluate(context, node)
        .map_err(|e| WpImportError::ParseError(format!("XPath evaluation failed: {}", e)))
}
