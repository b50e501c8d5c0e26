//! Reading exports from files or stdin and choosing a source adapter.
//!
//! Every adapter produces the same [`Channel`]/[`crate::wxr::Item`] shape, so
//! the transformer and importer never care where the data came from. WXR is
//! the only format implemented.

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use crate::wxr::{Channel, WxrParser};
use crate::{Result, WpImportError};

/// How many leading bytes to inspect when sniffing a file.
const SNIFF_LEN: usize = 1024;

/// A source format that can be read into channels.
pub trait SourceAdapter {
    /// Short human-readable name of the format.
    fn name(&self) -> &'static str;

    /// Reads raw file contents into channels.
    fn read(&self, raw: &[u8]) -> Result<Vec<Channel>>;
}

/// WordPress eXtended RSS exports.
#[derive(Debug, Default, Clone, Copy)]
pub struct WxrSource;

impl SourceAdapter for WxrSource {
    fn name(&self) -> &'static str {
        "WordPress WXR"
    }

    fn read(&self, raw: &[u8]) -> Result<Vec<Channel>> {
        WxrParser::new()?.parse(raw)
    }
}

/// Picks the adapter for `raw`, using the file extension when there is one.
///
/// `path` is `None` for stdin, in which case only the content is inspected.
///
/// # Errors
///
/// [`WpImportError::UnsupportedSource`] for anything that is not a
/// WordPress export.
pub fn detect_source(path: Option<&Path>, raw: &[u8]) -> Result<Box<dyn SourceAdapter>> {
    let extension = path
        .and_then(|p| p.extension())
        .map(|ext| ext.to_string_lossy().to_lowercase());

    match extension.as_deref() {
        Some("xml") | None if looks_like_wxr(raw) => Ok(Box::new(WxrSource)),
        Some("xml") => Err(WpImportError::UnsupportedSource(
            "XML, but not a WordPress export".to_string(),
        )),
        Some("zip") => Err(WpImportError::UnsupportedSource("ZIP archives are not supported".to_string())),
        Some("json") => Err(WpImportError::UnsupportedSource(
            "WriteFreely JSON files are not supported".to_string(),
        )),
        None => Err(WpImportError::UnsupportedSource("input is not a WordPress export".to_string())),
        Some(other) => Err(WpImportError::UnsupportedSource(format!("unrecognized file type: .{}", other))),
    }
}

/// True when the start of `raw` mentions WordPress, as every WXR export does
/// in its leading comment or `xmlns:wp` declaration.
pub fn looks_like_wxr(raw: &[u8]) -> bool {
    let head = &raw[..raw.len().min(SNIFF_LEN)];
    String::from_utf8_lossy(head).to_lowercase().contains("wordpress")
}

/// Reads an export from a local file.
pub fn read_file(path: &Path) -> Result<Vec<u8>> {
    if !path.exists() {
        Err(WpImportError::FileNotFound(path.to_path_buf()))
    } else {
        fs::read(path).map_err(WpImportError::from)
    }
}

/// Reads an export from standard input until EOF.
pub fn read_stdin() -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    io::stdin().read_to_end(&mut buffer).map_err(WpImportError::from)?;

    Ok(buffer)
}
