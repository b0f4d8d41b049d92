//! Item model and builder.
//!
//! Turns [`RawContent`] records into section items and standalone pages.
//! Building is a pure transformation: no filesystem writes.

use super::{
    markdown::{self, CodeBlockProcessor},
    reader::RawContent,
};
use crate::{
    config::{OutputMode, SiteConfig},
    error::BuildError,
    utils::{date::DateTimeUtc, slug::slugify},
};
use rayon::prelude::*;
use rustc_hash::FxHashSet;
use std::{
    hash::{Hash, Hasher},
    path::{Component, Path, PathBuf},
    sync::OnceLock,
};

// ============================================================================
// Tag
// ============================================================================

/// An item tag, written `name` or `classification:name` in front-matter.
///
/// Equality and hashing use the normalized `key`.
#[derive(Debug, Clone)]
pub struct Tag {
    /// Full text as written, e.g. `hidden:seo`.
    pub description: String,
    pub classification: Option<String>,
    /// Display name without the classification.
    pub name: String,
    /// Slug of the description; names the tag page.
    pub key: String,
}

impl Tag {
    /// `None` for blank input or text that slugifies to nothing.
    pub fn parse(raw: &str) -> Option<Self> {
        let description = raw.trim();
        let key = slugify(description);
        if key.is_empty() {
            return None;
        }

        let (classification, name) = match description.split_once(':') {
            Some((kind, name)) if !kind.trim().is_empty() && !name.trim().is_empty() => {
                (Some(kind.trim().to_owned()), name.trim().to_owned())
            }
            _ => (None, description.to_owned()),
        };

        Some(Self {
            description: description.to_owned(),
            classification,
            name,
            key,
        })
    }

    /// Hidden tags are left off tag lists but keep their tag page.
    pub fn is_hidden(&self, prefix: &str) -> bool {
        !prefix.is_empty() && self.description.starts_with(prefix)
    }

    /// Page path relative to the site root, e.g. `tags/swift`.
    pub fn rel_path(&self) -> String {
        format!("tags/{}", self.key)
    }
}

impl PartialEq for Tag {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Tag {}

impl Hash for Tag {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

/// Parse a comma-separated tag list, dropping empties and duplicates.
pub fn parse_tags(raw: &str) -> Vec<Tag> {
    let mut seen = FxHashSet::default();
    raw.split(',')
        .filter_map(Tag::parse)
        .filter(|tag| seen.insert(tag.key.clone()))
        .collect()
}

// ============================================================================
// Item / Page
// ============================================================================

/// One piece of content belonging to a section.
#[derive(Debug, Clone)]
pub struct Item {
    pub title: String,
    pub description: String,
    /// HTML fragment of the markdown body.
    pub body: String,
    pub date: DateTimeUtc,
    pub tags: Vec<Tag>,
    pub section: String,
    pub source: PathBuf,
    pub slug: String,
    /// Position in read order, the tie-breaker for every sort.
    pub index: usize,
    /// Full page HTML, set once by the renderer.
    pub rendered: OnceLock<String>,
}

impl Item {
    /// Page path relative to the site root, e.g. `posts/hello`.
    pub fn rel_path(&self) -> String {
        format!("{}/{}", self.section, self.slug)
    }

    pub fn url(&self, mode: OutputMode) -> String {
        mode.url(&self.rel_path())
    }

    /// Tags shown on pages and in the feed.
    pub fn visible_tags<'a>(&'a self, hidden_prefix: &'a str) -> impl Iterator<Item = &'a Tag> {
        self.tags.iter().filter(move |tag| !tag.is_hidden(hidden_prefix))
    }
}

/// A standalone file at the content root, outside every section.
#[derive(Debug, Clone)]
pub struct Page {
    pub title: String,
    pub description: String,
    pub body: String,
    pub date: DateTimeUtc,
    pub source: PathBuf,
    pub slug: String,
    pub index: usize,
}

impl Page {
    pub fn rel_path(&self) -> String {
        self.slug.clone()
    }
}

/// Everything the builder produced, in read order.
#[derive(Debug, Clone, Default)]
pub struct Content {
    pub items: Vec<Item>,
    pub pages: Vec<Page>,
}

// ============================================================================
// Builder
// ============================================================================

enum Built {
    Item(Item),
    Page(Page),
    Draft,
}

/// Fields shared by items and pages.
struct Common {
    title: String,
    description: String,
    body: String,
    date: DateTimeUtc,
    slug: String,
}

pub struct ItemBuilder<'a> {
    config: &'a SiteConfig,
    code_blocks: &'a dyn CodeBlockProcessor,
}

impl<'a> ItemBuilder<'a> {
    pub fn new(config: &'a SiteConfig, code_blocks: &'a dyn CodeBlockProcessor) -> Self {
        Self {
            config,
            code_blocks,
        }
    }

    /// Build all records in parallel.
    ///
    /// Output keeps read order; on failure the error of the earliest
    /// failing record is returned.
    pub fn build_all(&self, records: &[RawContent]) -> Result<Content, BuildError> {
        let built: Vec<Result<Built, BuildError>> =
            records.par_iter().map(|record| self.build(record)).collect();

        let mut content = Content::default();
        for result in built {
            match result? {
                Built::Item(item) => content.items.push(item),
                Built::Page(page) => content.pages.push(page),
                Built::Draft => {}
            }
        }
        Ok(content)
    }

    fn build(&self, record: &RawContent) -> Result<Built, BuildError> {
        let matter = &record.front_matter;
        let path = record.source.as_path();

        if let Some(line) = matter.malformed().first() {
            return Err(BuildError::validation(
                path,
                format!("malformed front-matter line `{line}`"),
            ));
        }

        let draft = match matter.get("draft") {
            Some(value) => parse_bool(value).ok_or_else(|| {
                BuildError::validation(path, format!("draft must be true or false, got `{value}`"))
            })?,
            None => false,
        };
        if draft && !self.config.build.drafts {
            return Ok(Built::Draft);
        }

        let section = match matter.get("section") {
            Some(section) => Some(section.to_owned()),
            None => section_from_path(&record.relative),
        };
        let Some(section) = section else {
            let common = self.common(record)?;
            return Ok(Built::Page(Page {
                title: common.title,
                description: common.description,
                body: common.body,
                date: common.date,
                source: record.source.clone(),
                slug: common.slug,
                index: record.index,
            }));
        };

        if !self.config.is_declared_section(&section) {
            return Err(BuildError::InvalidSection {
                section,
                path: record.source.clone(),
            });
        }

        let common = self.common(record)?;
        Ok(Built::Item(Item {
            title: common.title,
            description: common.description,
            body: common.body,
            date: common.date,
            tags: matter.get("tags").map(parse_tags).unwrap_or_default(),
            section,
            source: record.source.clone(),
            slug: common.slug,
            index: record.index,
            rendered: OnceLock::new(),
        }))
    }

    fn common(&self, record: &RawContent) -> Result<Common, BuildError> {
        let matter = &record.front_matter;
        let path = record.source.as_path();
        let title = matter.get("title").map(str::to_owned);
        let markdown = match title {
            Some(_) => markdown::render(&record.body, self.code_blocks),
            None => markdown::render_untitled(&record.body, self.code_blocks),
        };

        let title = title
            .or(markdown.first_heading)
            .filter(|title| !title.trim().is_empty())
            .ok_or_else(|| BuildError::validation(path, "missing title"))?;

        let date = match matter.get("date") {
            Some(value) => DateTimeUtc::parse(value)
                .ok_or_else(|| BuildError::validation(path, format!("invalid date `{value}`")))?,
            None => DateTimeUtc::from_system_time(record.modified),
        };

        let slug = match matter.get("slug") {
            Some(slug) => slugify(slug),
            None => slugify(&file_slug_source(&record.relative)),
        };
        if slug.is_empty() {
            return Err(BuildError::validation(path, "slug is empty"));
        }

        let description = matter
            .get("description")
            .map(str::to_owned)
            .unwrap_or(markdown.text);

        Ok(Common {
            title,
            description,
            body: markdown.html,
            date,
            slug,
        })
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" => Some(true),
        "false" | "no" => Some(false),
        _ => None,
    }
}

/// First directory of `relative`; `None` for files at the content root.
fn section_from_path(relative: &Path) -> Option<String> {
    let mut components = relative.components();
    let first = components.next()?;
    components.next()?;
    match first {
        Component::Normal(dir) => Some(dir.to_string_lossy().into_owned()),
        _ => None,
    }
}

/// File stem, or the parent directory name for `index.md` bundles.
fn file_slug_source(relative: &Path) -> String {
    let stem = relative
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    if stem == "index"
        && relative.components().count() > 2
        && let Some(parent) = relative.parent().and_then(Path::file_name)
    {
        return parent.to_string_lossy().into_owned();
    }
    stem
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{content::front_matter::FrontMatter, content::markdown::PlainCodeBlocks};
    use std::time::{Duration, UNIX_EPOCH};

    fn config() -> SiteConfig {
        SiteConfig::from_str(
            r#"
            [base]
            title = "Test"
            description = "Test"
            url = "https://example.com"

            [[sections]]
            id = "posts"
            [[sections]]
            id = "notes"
        "#,
        )
        .unwrap()
    }

    fn record(index: usize, relative: &str, source: &str) -> RawContent {
        let (front_matter, body) = FrontMatter::split(source);
        RawContent {
            source: PathBuf::from("content").join(relative),
            relative: PathBuf::from(relative),
            index,
            front_matter,
            body: body.to_owned(),
            // 2025-01-01
            modified: UNIX_EPOCH + Duration::from_secs(20089 * 86400),
        }
    }

    fn build(records: &[RawContent]) -> Result<Content, BuildError> {
        let config = config();
        ItemBuilder::new(&config, &PlainCodeBlocks).build_all(records)
    }

    #[test]
    fn test_tag_parse() {
        let tag = Tag::parse("  kind:Swift Tips ").unwrap();
        assert_eq!(tag.description, "kind:Swift Tips");
        assert_eq!(tag.classification.as_deref(), Some("kind"));
        assert_eq!(tag.name, "Swift Tips");
        assert_eq!(tag.key, "kind-swift-tips");
        assert_eq!(tag.rel_path(), "tags/kind-swift-tips");

        let tag = Tag::parse("rust").unwrap();
        assert!(tag.classification.is_none());
        assert_eq!(tag.name, "rust");

        assert!(Tag::parse("   ").is_none());
        assert!(Tag::parse("???").is_none());
    }

    #[test]
    fn test_tag_hidden_prefix() {
        assert!(Tag::parse("hidden:seo").unwrap().is_hidden("hidden"));
        assert!(Tag::parse("hiddenThing").unwrap().is_hidden("hidden"));
        assert!(!Tag::parse("swift").unwrap().is_hidden("hidden"));
        assert!(!Tag::parse("hidden").unwrap().is_hidden(""));
    }

    #[test]
    fn test_parse_tags_dedupes_by_key() {
        let tags = parse_tags("Swift, ios, , swift,  iOS ,rust");
        let names: Vec<&str> = tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["Swift", "ios", "rust"]);
        assert_eq!(tags[0], Tag::parse("SWIFT").unwrap());
    }

    #[test]
    fn test_build_item_from_front_matter() {
        let content = build(&[record(
            0,
            "posts/first.md",
            "---\ntitle: First Post\ndate: 2024-02-01\ntags: swift, hidden:seo\ndescription: Short\n---\nHello *world*.",
        )])
        .unwrap();

        let item = &content.items[0];
        assert_eq!(item.title, "First Post");
        assert_eq!(item.section, "posts");
        assert_eq!(item.slug, "first");
        assert_eq!(item.date, DateTimeUtc::from_ymd(2024, 2, 1));
        assert_eq!(item.description, "Short");
        assert_eq!(item.tags.len(), 2);
        assert!(item.body.contains("<em>world</em>"));
        assert_eq!(item.rel_path(), "posts/first");
        assert_eq!(item.url(OutputMode::Folder), "/posts/first/");

        let visible: Vec<&str> = item.visible_tags("hidden").map(|t| t.name.as_str()).collect();
        assert_eq!(visible, ["swift"]);
    }

    #[test]
    fn test_build_fallbacks() {
        let content = build(&[record(0, "posts/Hello World.md", "# From Heading\n\nBody text.")])
            .unwrap();
        let item = &content.items[0];
        assert_eq!(item.title, "From Heading");
        assert_eq!(item.slug, "hello-world");
        assert_eq!(item.description, "From Heading Body text.");
        assert!(!item.body.contains("From Heading"));
        assert!(item.body.contains("<p>Body text.</p>"));
        assert_eq!(item.date, DateTimeUtc::from_ymd(2025, 1, 1));
        assert!(item.tags.is_empty());
    }

    #[test]
    fn test_section_key_overrides_directory() {
        let content = build(&[record(
            0,
            "posts/moved.md",
            "---\ntitle: Moved\nsection: notes\n---\n",
        )])
        .unwrap();
        assert_eq!(content.items[0].section, "notes");
    }

    #[test]
    fn test_invalid_section() {
        let err = build(&[record(0, "recipes/soup.md", "# Soup")]).unwrap_err();
        match err {
            BuildError::InvalidSection { section, path } => {
                assert_eq!(section, "recipes");
                assert_eq!(path, PathBuf::from("content/recipes/soup.md"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_root_files_become_pages() {
        let content = build(&[record(0, "about.md", "---\ntitle: About me\n---\nHi")]).unwrap();
        assert!(content.items.is_empty());
        assert_eq!(content.pages[0].slug, "about");
        assert_eq!(content.pages[0].rel_path(), "about");
    }

    #[test]
    fn test_index_bundle_uses_directory_name() {
        let content = build(&[record(0, "posts/post-29/index.md", "# Post 29")]).unwrap();
        assert_eq!(content.items[0].slug, "post-29");
        assert_eq!(content.items[0].section, "posts");
    }

    #[test]
    fn test_validation_errors() {
        let missing_title = build(&[record(0, "posts/a.md", "no heading here")]).unwrap_err();
        assert!(missing_title.to_string().contains("missing title"));

        let bad_date = build(&[record(0, "posts/a.md", "---\ntitle: A\ndate: someday\n---\n")])
            .unwrap_err();
        assert!(bad_date.to_string().contains("invalid date `someday`"));

        let malformed = build(&[record(0, "posts/a.md", "---\ntitle: A\noops\n---\n")]).unwrap_err();
        assert!(malformed.to_string().contains("malformed front-matter line `oops`"));

        let bad_draft = build(&[record(0, "posts/a.md", "---\ntitle: A\ndraft: maybe\n---\n")])
            .unwrap_err();
        assert!(matches!(bad_draft, BuildError::Validation { .. }));
    }

    #[test]
    fn test_drafts_are_dropped_unless_enabled() {
        let records = [
            record(0, "posts/a.md", "---\ntitle: A\ndraft: true\n---\n"),
            record(1, "posts/b.md", "---\ntitle: B\n---\n"),
        ];
        let content = build(&records).unwrap();
        assert_eq!(content.items.len(), 1);
        assert_eq!(content.items[0].title, "B");

        let mut config = config();
        config.build.drafts = true;
        let content = ItemBuilder::new(&config, &PlainCodeBlocks)
            .build_all(&records)
            .unwrap();
        assert_eq!(content.items.len(), 2);
    }

    #[test]
    fn test_build_all_keeps_read_order_and_first_error() {
        let records: Vec<RawContent> = (0..32)
            .map(|i| record(i, &format!("posts/p{i}.md"), &format!("# Post {i}")))
            .collect();
        let content = build(&records).unwrap();
        let indexes: Vec<usize> = content.items.iter().map(|item| item.index).collect();
        assert_eq!(indexes, (0..32).collect::<Vec<_>>());

        let mut records = records;
        records[5] = record(5, "bad/p5.md", "# Five");
        records[20] = record(20, "worse/p20.md", "# Twenty");
        let err = build(&records).unwrap_err();
        assert_eq!(err.path(), Path::new("content/bad/p5.md"));
    }
}
