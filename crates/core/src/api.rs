//! Destination API types and the [`BlogClient`] seam.
//!
//! The importer only needs two calls from a Write.as/WriteFreely instance:
//! create a collection and create a post. They sit behind [`BlogClient`] so
//! the orchestrator can run against the real HTTP session, a dry run, or a
//! test double.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::Result;

/// Display style applied to every imported post.
pub const DEFAULT_FONT: &str = "norm";

/// Parameters for creating a post.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostParams {
    pub title: String,
    /// Empty means the instance picks a slug.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub slug: String,
    #[serde(rename = "body")]
    pub content: String,
    pub font: String,
    #[serde(rename = "lang")]
    pub language: String,
    #[serde(with = "time::serde::rfc3339::option", skip_serializing_if = "Option::is_none")]
    pub created: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option", skip_serializing_if = "Option::is_none")]
    pub updated: Option<OffsetDateTime>,
    /// Alias of the destination collection; part of the request path, not the body.
    #[serde(skip)]
    pub collection: String,
}

/// Parameters for creating a collection (blog).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionParams {
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
}

/// A collection as returned by the instance.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Collection {
    pub alias: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
}

/// A created post as returned by the instance.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreatedPost {
    pub id: String,
    #[serde(default)]
    pub slug: Option<String>,
}

/// The operations the importer needs from a destination instance.
#[async_trait]
pub trait BlogClient {
    /// Creates a collection.
    ///
    /// Must return [`crate::WpImportError::CollectionTaken`] when the name is
    /// already in use so the importer can retry with another title.
    async fn create_collection(&self, params: &CollectionParams) -> Result<Collection>;

    /// Creates a post in `post.collection`.
    async fn create_post(&self, post: &PostParams) -> Result<CreatedPost>;
}

/// Client that accepts every request without any network I/O.
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunClient;

#[async_trait]
impl BlogClient for DryRunClient {
    async fn create_collection(&self, params: &CollectionParams) -> Result<Collection> {
        tracing::debug!(title = %params.title, "dry run: create collection");
        Ok(Collection {
            alias: alias_for(&params.title),
            title: params.title.clone(),
            description: params.description.clone(),
        })
    }

    async fn create_post(&self, post: &PostParams) -> Result<CreatedPost> {
        tracing::debug!(title = %post.title, collection = %post.collection, "dry run: create post");
        Ok(CreatedPost { id: String::new(), slug: (!post.slug.is_empty()).then(|| post.slug.clone()) })
    }
}

/// Lowercase, hyphen-separated alias in the style WriteFreely generates.
pub fn alias_for(title: &str) -> String {
    title
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn post() -> PostParams {
        PostParams {
            title: "Hello".to_string(),
            slug: String::new(),
            content: "Body\n\n#intro".to_string(),
            font: DEFAULT_FONT.to_string(),
            language: "en".to_string(),
            created: Some(datetime!(2019-03-04 15:21:07 UTC)),
            updated: Some(datetime!(2019-03-04 15:21:07 UTC)),
            collection: "notes".to_string(),
        }
    }

    #[test]
    fn test_post_params_json() {
        let json = serde_json::to_value(post()).unwrap();

        assert_eq!(json["title"], "Hello");
        assert_eq!(json["body"], "Body\n\n#intro");
        assert_eq!(json["font"], "norm");
        assert_eq!(json["lang"], "en");
        assert_eq!(json["created"], "2019-03-04T15:21:07Z");
        assert_eq!(json["updated"], "2019-03-04T15:21:07Z");
        assert!(json.get("slug").is_none());
        assert!(json.get("collection").is_none());
    }

    #[test]
    fn test_post_params_json_without_dates() {
        let params = PostParams { created: None, updated: None, slug: "hello".to_string(), ..post() };
        let json = serde_json::to_value(params).unwrap();

        assert_eq!(json["slug"], "hello");
        assert!(json.get("created").is_none());
        assert!(json.get("updated").is_none());
    }

    #[test]
    fn test_collection_deserialize() {
        let collection: Collection =
            serde_json::from_str(r#"{"alias":"field-notes","title":"Field Notes","views":0}"#).unwrap();
        assert_eq!(collection.alias, "field-notes");
        assert_eq!(collection.description, "");
    }

    #[test]
    fn test_alias_for() {
        assert_eq!(alias_for("Field Notes"), "field-notes");
        assert_eq!(alias_for("  Rust & Ruby: 2024 "), "rust-ruby-2024");
        assert_eq!(alias_for(""), "");
    }

    #[tokio::test]
    async fn test_dry_run_client() {
        let client = DryRunClient;
        let params = CollectionParams { title: "Field Notes".to_string(), description: String::new() };

        let collection = client.create_collection(&params).await.unwrap();
        assert_eq!(collection.alias, "field-notes");

        let created = client.create_post(&post()).await.unwrap();
        assert_eq!(created.slug, None);
    }
}
