//! Import WordPress exports into Write.as and WriteFreely.
//!
//! The crate reads a WordPress eXtended RSS (WXR) export, converts each post
//! body to Markdown, and creates the posts through a [`BlogClient`].
//!
//! ```rust
//! use wpimport_core::{DryRunClient, ImportConfig, parse_wxr, run_import};
//!
//! # async fn demo(raw: &[u8]) -> wpimport_core::Result<()> {
//! let channels = parse_wxr(raw)?;
//! let report = run_import(&DryRunClient, &channels, &ImportConfig::blog("my-blog")).await?;
//! println!("Created {} posts.", report.posts_created);
//! # Ok(())
//! # }
//! ```

pub mod api;
#[cfg(feature = "client")]
pub mod client;
pub mod error;
pub mod import;
pub mod instances;
pub mod markdown;
pub mod markers;
pub mod source;
pub mod transform;
pub mod wxr;

pub use api::{BlogClient, Collection, CollectionParams, CreatedPost, DEFAULT_FONT, DryRunClient, PostParams};
#[cfg(feature = "client")]
pub use client::{ClientConfig, DEFAULT_INSTANCE, Session, WriteFreelyClient, instance_api_url};
pub use error::{Result, WpImportError};
pub use import::{ChannelFailure, Destination, ImportConfig, ImportReport, ItemFailure, import_wordpress, run_import};
pub use instances::{Instance, InstanceStore};
pub use markdown::{MarkdownConfig, MarkdownFormatter, convert_to_markdown};
pub use markers::strip_block_markers;
pub use source::{SourceAdapter, WxrSource, detect_source, read_file, read_stdin};
pub use transform::{transform_content, transform_post};
pub use wxr::{Category, Channel, Item, PostType, WxrParser, parse_wxr};
