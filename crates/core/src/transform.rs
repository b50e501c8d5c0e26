//! Conversion of one WordPress item into one destination post.
//!
//! The pipeline is: skip anything that is not a post, convert the body to
//! Markdown, strip block-editor markers, append hashtags built from the
//! item's `post_tag` categories, and fill in the metadata.
//!
//! # Example
//!
//! ```rust
//! use wpimport_core::transform::transform_post;
//! use wpimport_core::wxr::{Category, Item, PostType};
//!
//! let item = Item {
//!     title: "Hello".to_string(),
//!     slug: "hello".to_string(),
//!     content: "<!-- wp:paragraph -->\n<p>Hi there</p>\n<!-- /wp:paragraph -->".to_string(),
//!     published: None,
//!     post_type: PostType::Post,
//!     status: "publish".to_string(),
//!     categories: vec![Category {
//!         domain: "post_tag".to_string(),
//!         nicename: "intro".to_string(),
//!         name: "intro".to_string(),
//!     }],
//! };
//!
//! let post = transform_post(&item, "en-US", "my-blog").unwrap().unwrap();
//! assert_eq!(post.content, "Hi there\n\n#intro");
//! assert_eq!(post.language, "en");
//! ```

use crate::Result;
use crate::api::{DEFAULT_FONT, PostParams};
use crate::markdown::convert_to_markdown;
use crate::markers::strip_block_markers;
use crate::wxr::{Category, Item, PostType};

/// Transforms `item` into a post for `collection`.
///
/// Returns `Ok(None)` for anything other than [`PostType::Post`].
///
/// # Errors
///
/// [`crate::WpImportError::ConversionError`] when the body cannot be
/// converted. Only this item is affected.
pub fn transform_post(item: &Item, channel_language: &str, collection: &str) -> Result<Option<PostParams>> {
    if item.post_type != PostType::Post {
        return Ok(None);
    }

    let content = transform_content(&item.content, &item.categories)?;

    Ok(Some(PostParams {
        title: item.title.clone(),
        slug: item.slug.clone(),
        content,
        font: DEFAULT_FONT.to_string(),
        language: two_letter_language(channel_language),
        created: item.published,
        updated: item.published,
        collection: collection.to_string(),
    }))
}

/// Converts a raw WordPress body to Markdown and appends its hashtag line.
pub fn transform_content(raw: &str, categories: &[Category]) -> Result<String> {
    let markdown = convert_to_markdown(raw)?;
    let mut content = strip_block_markers(&markdown).trim().to_string();

    let tags = tag_line(categories);
    if !tags.is_empty() {
        content.push_str("\n\n");
        content.push_str(&tags);
    }

    Ok(content)
}

/// `#name` for every `post_tag` category, in source order, space separated.
pub fn tag_line(categories: &[Category]) -> String {
    categories
        .iter()
        .filter(|category| category.is_tag())
        .map(|category| format!("#{}", category.name))
        .collect::<Vec<_>>()
        .join(" ")
}

/// First two characters of a language tag (`en-US` → `en`).
pub fn two_letter_language(language: &str) -> String {
    language.chars().take(2).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use time::macros::datetime;

    fn category(domain: &str, name: &str) -> Category {
        Category { domain: domain.to_string(), nicename: name.to_lowercase(), name: name.to_string() }
    }

    fn item(post_type: PostType, content: &str, categories: Vec<Category>) -> Item {
        Item {
            title: "A day out".to_string(),
            slug: "a-day-out".to_string(),
            content: content.to_string(),
            published: Some(datetime!(2020-06-01 08:30:00 UTC)),
            post_type,
            status: "publish".to_string(),
            categories,
        }
    }

    #[rstest]
    #[case(PostType::Page)]
    #[case(PostType::Attachment)]
    #[case(PostType::Other("revision".to_string()))]
    #[case(PostType::Other("nav_menu_item".to_string()))]
    fn test_non_posts_are_skipped(#[case] post_type: PostType) {
        let item = item(post_type, "<p>Body</p>", vec![category("post_tag", "x")]);
        assert_eq!(transform_post(&item, "en", "blog").unwrap(), None);
    }

    #[test]
    fn test_post_metadata() {
        let item = item(PostType::Post, "<p>Body</p>", Vec::new());
        let post = transform_post(&item, "fr-CA", "travel").unwrap().unwrap();

        assert_eq!(post.title, "A day out");
        assert_eq!(post.slug, "a-day-out");
        assert_eq!(post.font, "norm");
        assert_eq!(post.language, "fr");
        assert_eq!(post.collection, "travel");
        assert_eq!(post.created, Some(datetime!(2020-06-01 08:30:00 UTC)));
        assert_eq!(post.updated, post.created);
    }

    #[test]
    fn test_end_to_end_scenario() {
        let item = item(
            PostType::Post,
            "<p>Hello <!-- wp:paragraph --> world</p>",
            vec![category("post_tag", "intro"), category("category", "Blog")],
        );
        let post = transform_post(&item, "en-US", "blog").unwrap().unwrap();

        assert!(post.content.starts_with("Hello"));
        assert!(post.content.ends_with("world\n\n#intro"));
        assert!(!post.content.contains("wp:paragraph"));
        assert!(!post.content.contains("#Blog"));
        assert_eq!(post.language, "en");
    }

    #[test]
    fn test_no_tags_means_no_tag_line() {
        let item = item(PostType::Post, "<p>Only words</p>", vec![category("category", "Uncategorized")]);
        let post = transform_post(&item, "en", "blog").unwrap().unwrap();

        assert_eq!(post.content, "Only words");
        assert!(!post.content.contains("\n\n#"));
    }

    #[test]
    fn test_tags_keep_source_order() {
        let categories = vec![
            category("post_tag", "rust"),
            category("category", "Code"),
            category("post_tag", "wasm"),
            category("post_tag", "Open Source"),
        ];
        let item = item(PostType::Post, "<p>Text</p>", categories);
        let post = transform_post(&item, "en", "blog").unwrap().unwrap();

        assert!(post.content.ends_with("\n\n#rust #wasm #Open Source"));
    }

    #[test]
    fn test_block_markers_removed_more_kept() {
        let body = "<!-- wp:paragraph -->\n<p>Intro</p>\n<!-- /wp:paragraph -->\n\n<!-- more -->\n\n<!-- wp:paragraph -->\n<p>Rest</p>\n<!-- /wp:paragraph -->";
        let item = item(PostType::Post, body, Vec::new());
        let post = transform_post(&item, "en", "blog").unwrap().unwrap();

        assert!(post.content.starts_with("Intro"));
        assert!(post.content.contains("<!-- more -->"));
        assert!(post.content.ends_with("Rest"));
        assert!(!post.content.contains("wp:"));
    }

    #[test]
    fn test_list_block_markup() {
        let body = "<!-- wp:list --><ul><!-- wp:list-item --><li>First</li><!-- /wp:list-item --><!-- wp:list-item --><li>Second</li><!-- /wp:list-item --></ul><!-- /wp:list -->";
        assert_eq!(transform_content(body, &[]).unwrap(), "*   First\n*   Second");
    }

    #[test]
    fn test_list_block_markup_across_lines() {
        let body = "<!-- wp:list -->\n<ul><!-- wp:list-item -->\n<li>First</li>\n<!-- /wp:list-item -->\n\n<!-- wp:list-item -->\n<li>Second</li>\n<!-- /wp:list-item --></ul>\n<!-- /wp:list -->";
        let plain = "\n<ul>\n<li>First</li>\n\n\n\n<li>Second</li>\n</ul>\n";

        let content = transform_content(body, &[]).unwrap();
        assert_eq!(content, transform_content(plain, &[]).unwrap());
        assert_eq!(content.lines().filter(|line| line.starts_with('*')).count(), 2);
    }

    #[test]
    fn test_quote_block_markup() {
        let body = "<!-- wp:quote --><blockquote class=\"wp-block-quote\"><!-- wp:paragraph --><p>Quoted</p><!-- /wp:paragraph --></blockquote><!-- /wp:quote -->";
        assert_eq!(transform_content(body, &[]).unwrap(), "> Quoted");
    }

    #[test]
    fn test_group_block_markup() {
        let body = "<!-- wp:group --><div class=\"wp-block-group\"><!-- wp:paragraph --><p>A</p><!-- /wp:paragraph --><!-- wp:paragraph --><p>B</p><!-- /wp:paragraph --></div><!-- /wp:group -->";
        let tags = [category("post_tag", "x")];
        assert_eq!(transform_content(body, &tags).unwrap(), "A\n\nB\n\n#x");
    }

    #[test]
    fn test_more_block_survives() {
        let body = "<!-- wp:paragraph --><p>Intro</p><!-- /wp:paragraph --><!-- wp:more --><!--more--><!-- /wp:more --><!-- wp:paragraph --><p>Rest</p><!-- /wp:paragraph -->";
        let content = transform_content(body, &[]).unwrap();

        assert!(content.contains("<!-- wp:more -->"));
        assert!(content.contains("<!--more-->"));
        assert!(content.contains("<!-- /wp:more -->"));
        assert!(!content.contains("wp:paragraph"));
    }

    #[test]
    fn test_transform_is_deterministic() {
        let item = item(
            PostType::Post,
            "<!-- wp:heading -->\n<h2>Title</h2>\n<!-- /wp:heading -->\n<p><em>x</em></p>",
            vec![category("post_tag", "a")],
        );

        let first = transform_post(&item, "en-GB", "blog").unwrap();
        let second = transform_post(&item, "en-GB", "blog").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_slug_passes_through() {
        let mut item = item(PostType::Post, "<p>x</p>", Vec::new());
        item.slug = String::new();

        let post = transform_post(&item, "en", "blog").unwrap().unwrap();
        assert_eq!(post.slug, "");
    }

    #[rstest]
    #[case("", "")]
    #[case("e", "e")]
    #[case("en", "en")]
    #[case("en-US", "en")]
    #[case("pt-BR", "pt")]
    #[case("zh-Hant-TW", "zh")]
    fn test_two_letter_language(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(two_letter_language(input), expected);
    }

    #[test]
    fn test_tag_line() {
        assert_eq!(tag_line(&[]), "");
        assert_eq!(tag_line(&[category("category", "News")]), "");
        assert_eq!(tag_line(&[category("post_tag", "one"), category("post_tag", "two")]), "#one #two");
    }
}
