//! Sitemap generation.
//!
//! Lists every HTML artifact for search engine indexing.
//!
//! # Sitemap Format
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
//!   <url>
//!     <loc>https://example.com/</loc>
//!   </url>
//!   <url>
//!     <loc>https://example.com/posts/hello/</loc>
//!     <lastmod>2025-01-01</lastmod>
//!   </url>
//! </urlset>
//! ```

use crate::{
    config::{Indentation, SiteConfig},
    error::RenderError,
    render::{Artifact, ArtifactKind, ArtifactSet, links::resource_url},
};
use quick_xml::{
    Writer,
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
};
use std::{fmt::Display, path::Path};

// ============================================================================
// Constants
// ============================================================================

/// XML namespace for sitemap
const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

// ============================================================================
// Public API
// ============================================================================

/// Build the sitemap artifact from the HTML artifacts of the run.
pub fn build_sitemap(config: &SiteConfig, artifacts: &ArtifactSet) -> Result<Artifact, RenderError> {
    let path = config.sitemap.path.clone();
    let url = resource_url(&path);

    let entries: Vec<UrlEntry> = artifacts
        .of_kind(ArtifactKind::Html)
        .into_iter()
        .filter(|artifact| !is_excluded(&artifact.path, &config.sitemap.exclude))
        .map(|artifact| UrlEntry {
            loc: config.full_url(&artifact.url),
            lastmod: artifact.lastmod.map(|date| date.ymd()),
        })
        .collect();

    let xml = write_xml(&entries, config.sitemap.indent).map_err(|err| RenderError::Template {
        page: url.clone(),
        message: format!("sitemap: {err}"),
    })?;

    Ok(Artifact::new(path, url, xml, ArtifactKind::Sitemap))
}

// ============================================================================
// XML Writing
// ============================================================================

/// Single URL entry in the sitemap
struct UrlEntry {
    loc: String,
    /// `YYYY-MM-DD`
    lastmod: Option<String>,
}

fn write_xml(entries: &[UrlEntry], indent: Indentation) -> Result<Vec<u8>, String> {
    let mut writer = match indent {
        Indentation::None => Writer::new(Vec::with_capacity(4096)),
        Indentation::Spaces(n) => Writer::new_with_indent(Vec::with_capacity(4096), b' ', n),
        Indentation::Tabs(n) => Writer::new_with_indent(Vec::with_capacity(4096), b'\t', n),
    };

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(stringify)?;
    writer
        .write_event(Event::Start(
            BytesStart::new("urlset").with_attributes([("xmlns", SITEMAP_NS)]),
        ))
        .map_err(stringify)?;

    for entry in entries {
        writer
            .write_event(Event::Start(BytesStart::new("url")))
            .map_err(stringify)?;
        write_text_element(&mut writer, "loc", &entry.loc)?;
        if let Some(lastmod) = &entry.lastmod {
            write_text_element(&mut writer, "lastmod", lastmod)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new("url")))
            .map_err(stringify)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("urlset")))
        .map_err(stringify)?;

    let mut xml = writer.into_inner();
    xml.push(b'\n');
    Ok(xml)
}

fn write_text_element(writer: &mut Writer<Vec<u8>>, name: &str, text: &str) -> Result<(), String> {
    writer
        .write_event(Event::Start(BytesStart::new(name)))
        .map_err(stringify)?;
    writer
        .write_event(Event::Text(BytesText::new(text)))
        .map_err(stringify)?;
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(stringify)
}

fn stringify(err: impl Display) -> String {
    err.to_string()
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Whether the page at `path` falls under one of the `exclude` prefixes.
///
/// Prefixes match whole path segments, in both output modes:
/// `tags` excludes `tags/index.html`, `tags.html` and `tags/swift/index.html`.
fn is_excluded(path: &Path, exclude: &[String]) -> bool {
    let rel = page_rel(path);
    exclude.iter().any(|prefix| {
        let prefix = prefix.trim_matches('/');
        !prefix.is_empty()
            && (rel == prefix
                || rel
                    .strip_prefix(prefix)
                    .is_some_and(|rest| rest.starts_with('/')))
    })
}

/// `posts/hello/index.html` or `posts/hello.html` -> `posts/hello`.
fn page_rel(path: &Path) -> String {
    let path = path.to_string_lossy().replace('\\', "/");
    let rel = path
        .strip_suffix("index.html")
        .map(|dir| dir.trim_end_matches('/'))
        .or_else(|| path.strip_suffix(".html"))
        .unwrap_or(&path);
    rel.to_owned()
}

// ============================================================================
// Tests
// ============================================================================
