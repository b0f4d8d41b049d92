//! `[base]` section configuration.
//!
//! Site identity: title, description, url, language and the optional
//! favicon / social card metadata rendered into every page head.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};

/// `[base]` section in quire.toml - basic site metadata.
///
/// # Example
/// ```toml
/// [base]
/// title = "DreamBuildShip"
/// description = "A description of DreamBuildShip"
/// url = "https://dreambuildship.com"
/// language = "en"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct BaseConfig {
    /// Site display name, used in page titles, the header and the feed.
    pub title: String,

    /// Site description for meta tags and the feed channel.
    pub description: String,

    /// Author name, shown in the footer copyright line.
    #[serde(default = "defaults::base::author")]
    #[educe(Default = defaults::base::author())]
    pub author: String,

    /// Base URL for absolute links in feed and sitemap.
    #[serde(default = "defaults::base::url")]
    #[educe(Default = defaults::base::url())]
    pub url: Option<String>,

    /// BCP 47 language code (e.g., "en", "en-US").
    #[serde(default = "defaults::base::language")]
    #[educe(Default = defaults::base::language())]
    pub language: String,

    /// Favicon URL path, e.g. "/favicon.png".
    #[serde(default)]
    pub favicon: Option<String>,

    /// Site image URL path, used as the default social card image.
    #[serde(default)]
    pub image: Option<String>,

    /// Social card metadata.
    #[serde(default)]
    pub social: Option<SocialConfig>,
}

/// `[base.social]` section - twitter/open graph card settings.
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SocialConfig {
    /// Twitter handle including the `@`.
    #[serde(default)]
    pub twitter: Option<String>,

    /// Card type: "summary" or "summary_large_image".
    #[serde(default = "defaults::base::card")]
    #[educe(Default = defaults::base::card())]
    pub card: String,
}
