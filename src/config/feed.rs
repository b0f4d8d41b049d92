//! `[feed]` and `[sitemap]` section configuration.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[feed]` section in quire.toml - RSS feed generation.
///
/// # Example
/// ```toml
/// [feed]
/// include = ["posts"]
/// path = "feed.rss"
/// description_length = 200
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct FeedConfig {
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub enable: bool,

    /// Sections whose items go into the feed (default: every declared section).
    #[serde(default)]
    pub include: Option<Vec<String>>,

    /// Output path relative to the output directory.
    #[serde(default = "defaults::feed::path")]
    #[educe(Default = defaults::feed::path())]
    pub path: PathBuf,

    /// Item descriptions are cut to this many characters.
    #[serde(default = "defaults::feed::description_length")]
    #[educe(Default = defaults::feed::description_length())]
    pub description_length: usize,

    /// Maximum number of feed entries.
    #[serde(default = "defaults::feed::limit")]
    #[educe(Default = defaults::feed::limit())]
    pub limit: usize,
}

impl FeedConfig {
    pub fn includes(&self, section: &str) -> bool {
        self.include
            .as_ref()
            .is_none_or(|ids| ids.iter().any(|id| id == section))
    }
}

/// Sitemap indentation style.
///
/// ```toml
/// indent = "none"
/// indent = { spaces = 2 }
/// indent = { tabs = 1 }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Indentation {
    None,
    Spaces(usize),
    Tabs(usize),
}

/// `[sitemap]` section in quire.toml.
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SitemapConfig {
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub enable: bool,

    #[serde(default = "defaults::sitemap::path")]
    #[educe(Default = defaults::sitemap::path())]
    pub path: PathBuf,

    /// Output path prefixes left out of the sitemap, e.g. `["tags"]`.
    #[serde(default)]
    pub exclude: Vec<String>,

    #[serde(default = "defaults::sitemap::indent")]
    #[educe(Default = defaults::sitemap::indent())]
    pub indent: Indentation,
}
