//! Link table and link checking.
//!
//! Every URL the run will produce is planned before anything is rendered;
//! rendered pages are then checked against the table so a broken internal
//! link fails the build instead of shipping.

use crate::error::RenderError;
use quick_xml::escape::unescape;
use regex::Regex;
use rustc_hash::FxHashSet;
use std::{borrow::Cow, path::Path, sync::LazyLock};

static RE_LINK_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\b(?:href|src)\s*=\s*(?:"([^"]*)"|'([^']*)')"#).unwrap()
});

#[derive(Debug, Default)]
pub struct LinkTable {
    urls: FxHashSet<String>,
}

impl LinkTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when `url` was already planned.
    pub fn insert(&mut self, url: impl Into<String>) -> bool {
        self.urls.insert(url.into())
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    /// Whether a root-relative `target` points at a planned URL.
    ///
    /// Query strings and fragments are ignored; `/a` and `/a/index.html`
    /// both resolve to the folder page `/a/`.
    pub fn resolves(&self, target: &str) -> bool {
        let path = target
            .split(['#', '?'])
            .next()
            .unwrap_or_default();
        if path.is_empty() {
            return true;
        }

        let path = urlencoding::decode(path).unwrap_or_else(|_| {
            let bytes = urlencoding::decode_binary(path.as_bytes());
            Cow::Owned(String::from_utf8_lossy(&bytes).into_owned())
        });
        let path = path.as_ref();
        if self.urls.contains(path) {
            return true;
        }
        if let Some(dir) = path.strip_suffix("index.html")
            && self.urls.contains(dir)
        {
            return true;
        }
        !path.ends_with('/') && self.urls.contains(&format!("{path}/"))
    }

    /// Check every root-relative `href`/`src` in `html`.
    pub fn check(&self, from: &str, html: &str) -> Result<(), RenderError> {
        match internal_links(html).find(|target| !self.resolves(target)) {
            Some(target) => Err(RenderError::BrokenLink {
                from: from.to_owned(),
                target: target.into_owned(),
            }),
            None => Ok(()),
        }
    }
}

/// Root-relative link targets (`/x`, not `//host/x` or `https://...`),
/// with character references such as `&amp;` decoded.
pub fn internal_links(html: &str) -> impl Iterator<Item = Cow<'_, str>> {
    RE_LINK_ATTR
        .captures_iter(html)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| {
            let raw = m.as_str();
            unescape(raw).unwrap_or(Cow::Borrowed(raw))
        })
        .filter(|target| target.starts_with('/') && !target.starts_with("//"))
}

/// URL of a copied resource, e.g. `images/logo.png` -> `/images/logo.png`.
pub fn resource_url(relative: &Path) -> String {
    let mut url = String::new();
    for component in relative.components() {
        url.push('/');
        url.push_str(&component.as_os_str().to_string_lossy());
    }
    url
}
