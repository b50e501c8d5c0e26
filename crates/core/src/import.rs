//! Import orchestration.
//!
//! Walks every channel and item of an export in source order, transforms each
//! post, and hands it to a [`BlogClient`]. Per-item failures are logged and
//! recorded in the [`ImportReport`]; they never stop the run.

use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::api::{BlogClient, Collection, CollectionParams};
use crate::transform::transform_post;
use crate::wxr::{Channel, Item, parse_wxr};
use crate::{Result, WpImportError};

/// Where imported posts go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// An existing collection, by alias.
    Blog(String),
    /// A new collection per channel, titled after the channel.
    NewBlogs,
}

/// Configuration for an import run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportConfig {
    pub destination: Destination,
}

impl ImportConfig {
    pub fn blog(alias: impl Into<String>) -> Self {
        Self { destination: Destination::Blog(alias.into()) }
    }

    pub fn new_blogs() -> Self {
        Self { destination: Destination::NewBlogs }
    }
}

/// A post that could not be imported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFailure {
    pub channel: String,
    pub title: String,
    pub error: String,
}

/// A channel whose posts were skipped because no collection could be created for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelFailure {
    pub channel: String,
    pub error: String,
}

/// Outcome of an import run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Channels visited.
    pub channels: usize,
    /// Posts the destination accepted.
    pub posts_created: usize,
    /// Pages, attachments, and other non-post items.
    pub skipped: usize,
    /// Aliases of collections created in [`Destination::NewBlogs`] mode.
    pub collections: Vec<String>,
    pub failures: Vec<ItemFailure>,
    pub skipped_channels: Vec<ChannelFailure>,
}

enum CollectionOutcome {
    Created(Collection),
    Skipped(WpImportError),
}

/// Parses `raw` and imports every post into the collection `destination_alias`.
///
/// Returns the number of posts created.
///
/// # Errors
///
/// Fails only if the export cannot be parsed; per-post failures are logged
/// and skipped.
pub async fn import_wordpress<C>(client: &C, destination_alias: &str, raw: &[u8]) -> Result<usize>
where
    C: BlogClient + ?Sized,
{
    let channels = parse_wxr(raw)?;
    let report = run_import(client, &channels, &ImportConfig::blog(destination_alias)).await?;
    Ok(report.posts_created)
}

/// Imports already-parsed channels.
///
/// # Errors
///
/// In [`Destination::NewBlogs`] mode, a collection error other than
/// [`WpImportError::CollectionTaken`] aborts the run. Nothing else does.
pub async fn run_import<C>(client: &C, channels: &[Channel], config: &ImportConfig) -> Result<ImportReport>
where
    C: BlogClient + ?Sized,
{
    info!("Found {} channels.", channels.len());
    let mut report = ImportReport::default();

    for channel in channels {
        report.channels += 1;
        info!("Channel: {}", channel.title);

        let alias = match &config.destination {
            Destination::Blog(alias) => alias.clone(),
            Destination::NewBlogs => match create_channel_collection(client, channel).await? {
                CollectionOutcome::Created(collection) => {
                    report.collections.push(collection.alias.clone());
                    collection.alias
                }
                CollectionOutcome::Skipped(e) => {
                    error!(channel = %channel.title, error = %e, "skipping channel");
                    report
                        .skipped_channels
                        .push(ChannelFailure { channel: channel.title.clone(), error: e.to_string() });
                    continue;
                }
            },
        };

        info!("Found {} items.", channel.items.len());
        for item in &channel.items {
            import_item(client, channel, item, &alias, &mut report).await;
        }
    }

    info!("Created {} posts.", report.posts_created);
    Ok(report)
}

async fn import_item<C>(client: &C, channel: &Channel, item: &Item, alias: &str, report: &mut ImportReport)
where
    C: BlogClient + ?Sized,
{
    let post = match transform_post(item, &channel.language, alias) {
        Ok(Some(post)) => post,
        Ok(None) => {
            debug!(title = %item.title, post_type = item.post_type.as_str(), "skipping non-post item");
            report.skipped += 1;
            return;
        }
        Err(e) => {
            warn!(title = %item.title, error = %e, "could not convert post");
            report.failures.push(failure(channel, item, &e));
            return;
        }
    };

    info!("Creating {}", post.title);
    match client.create_post(&post).await {
        Ok(_) => report.posts_created += 1,
        Err(e) => {
            error!(title = %post.title, error = %e, "create post failed");
            report.failures.push(failure(channel, item, &e));
        }
    }
}

async fn create_channel_collection<C>(client: &C, channel: &Channel) -> Result<CollectionOutcome>
where
    C: BlogClient + ?Sized,
{
    let mut params = CollectionParams { title: channel.title.clone(), description: channel.description.clone() };

    info!("Creating {}...", params.title);
    match client.create_collection(&params).await {
        Ok(collection) => Ok(CollectionOutcome::Created(collection)),
        Err(WpImportError::CollectionTaken(_)) => {
            params.title = format!("{} {}", channel.title, random_suffix());
            warn!("A blog by that name already exists. Changing to {}...", params.title);

            match client.create_collection(&params).await {
                Ok(collection) => Ok(CollectionOutcome::Created(collection)),
                Err(e) => Ok(CollectionOutcome::Skipped(e)),
            }
        }
        Err(e) => Err(e),
    }
}

fn failure(channel: &Channel, item: &Item, error: &WpImportError) -> ItemFailure {
    ItemFailure { channel: channel.title.clone(), title: item.title.clone(), error: error.to_string() }
}

/// Four lowercase alphanumerics for disambiguating a taken collection name.
fn random_suffix() -> String {
    Uuid::new_v4().simple().to_string()[..4].to_string()
}
