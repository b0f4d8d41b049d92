//! Renderer.
//!
//! Turns the organized model into HTML artifacts in three passes:
//!
//! 1. **Plan**: every page of the run is listed up front, and its URL goes
//!    into a [`LinkTable`] together with resource, feed and sitemap URLs.
//! 2. **Render**: pages are rendered in parallel into memory.
//! 3. **Check and collect**: each page's root-relative links are checked
//!    against the table, then the page is minified and inserted into the
//!    [`ArtifactSet`].
//!
//! Nothing touches the filesystem here; the pipeline writes the set once
//! every stage has succeeded.

pub mod artifact;
pub mod links;
pub mod theme;

pub use artifact::{Artifact, ArtifactKind, ArtifactSet};
pub use links::LinkTable;

use crate::{
    config::{OutputMode, SiteConfig},
    content::{IndexPage, Item, Page, Resource, Section, Sections, TagEntry},
    error::RenderError,
    utils::minify::minify_html,
};
use links::resource_url;
use maud::Markup;
use rayon::prelude::*;
use std::{collections::BTreeMap, path::Path};
use theme::{STYLESHEET, STYLESHEET_PATH, Theme};

/// What a planned page shows, and the data it is rendered from.
#[derive(Debug, Clone, Copy)]
pub enum PageKind<'a> {
    Home,
    Item(&'a Item),
    SectionIndex(&'a Section, IndexPage<'a>),
    TagIndex,
    TagDetail(&'a TagEntry<'a>),
    Custom(&'a Page),
}

/// A page the run will produce.
#[derive(Debug, Clone)]
pub struct PlannedPage<'a> {
    /// Path relative to the site root without extension, `""` for home.
    pub rel: String,
    pub kind: PageKind<'a>,
}

type Tags<'a> = BTreeMap<&'a str, TagEntry<'a>>;

pub struct Renderer<'a> {
    config: &'a SiteConfig,
    sections: &'a Sections,
    pages: &'a [Page],
    mode: OutputMode,
    theme: Theme<'a>,
}

impl<'a> Renderer<'a> {
    pub fn new(config: &'a SiteConfig, sections: &'a Sections, pages: &'a [Page]) -> Self {
        Self {
            config,
            sections,
            pages,
            mode: config.build.output_mode,
            theme: Theme::new(config, sections),
        }
    }

    /// Render every page and collect them with `resources` into one set.
    ///
    /// Fails on the first broken internal link (in path order) or on two
    /// artifacts sharing an output path.
    pub fn render(&self, resources: Vec<Resource>) -> Result<ArtifactSet, RenderError> {
        let tags = self.sections.tags();
        let latest = self.sections.latest();

        let mut plan = self.plan(&tags);
        plan.sort_by(|a, b| a.rel.cmp(&b.rel));

        let table = self.link_table(&plan, &resources);

        let rendered: Vec<(&PlannedPage<'_>, String)> = plan
            .par_iter()
            .map(|page| (page, self.render_page(page, &latest, &tags).into_string()))
            .collect();

        for (page, html) in &rendered {
            table.check(&self.mode.url(&page.rel), html)?;
        }

        let set = ArtifactSet::new();
        rendered.into_par_iter().try_for_each(|(page, html)| {
            let content = minify_html(html.as_bytes(), self.config).into_owned();
            let mut artifact = Artifact::new(
                self.mode.file(&page.rel),
                self.mode.url(&page.rel),
                content,
                ArtifactKind::Html,
            );
            if let PageKind::Item(item) = page.kind {
                artifact = artifact.with_lastmod(item.date);
                // First render wins
                let _ = item.rendered.set(html);
            }
            set.insert(artifact)
        })?;

        let has_stylesheet = resources
            .iter()
            .any(|resource| resource.relative == Path::new(STYLESHEET_PATH));
        if !has_stylesheet {
            set.insert(Artifact::new(
                STYLESHEET_PATH.into(),
                resource_url(Path::new(STYLESHEET_PATH)),
                STYLESHEET.as_bytes().to_vec(),
                ArtifactKind::Asset,
            ))?;
        }

        for resource in resources {
            let url = resource_url(&resource.relative);
            set.insert(Artifact::new(
                resource.relative,
                url,
                resource.bytes,
                ArtifactKind::Asset,
            ))?;
        }

        Ok(set)
    }

    /// Every page of the run, in model order.
    fn plan<'p>(&'p self, tags: &'p Tags<'p>) -> Vec<PlannedPage<'p>> {
        let mut plan = vec![PlannedPage {
            rel: String::new(),
            kind: PageKind::Home,
        }];

        for section in self.sections.iter() {
            plan.extend(section.items.iter().map(|item| PlannedPage {
                rel: item.rel_path(),
                kind: PageKind::Item(item),
            }));
            plan.extend(section.pages(self.mode).into_iter().map(|page| PlannedPage {
                rel: section.page_rel_path(page.number),
                kind: PageKind::SectionIndex(section, page),
            }));
        }

        plan.push(PlannedPage {
            rel: "tags".to_owned(),
            kind: PageKind::TagIndex,
        });
        plan.extend(tags.values().map(|entry| PlannedPage {
            rel: entry.tag.rel_path(),
            kind: PageKind::TagDetail(entry),
        }));

        plan.extend(self.pages.iter().map(|page| PlannedPage {
            rel: page.rel_path(),
            kind: PageKind::Custom(page),
        }));
        plan
    }

    fn link_table(&self, plan: &[PlannedPage<'_>], resources: &[Resource]) -> LinkTable {
        let mut table = LinkTable::new();
        for page in plan {
            table.insert(self.mode.url(&page.rel));
        }
        for resource in resources {
            table.insert(resource_url(&resource.relative));
        }
        table.insert(resource_url(Path::new(STYLESHEET_PATH)));
        if self.config.feed.enable {
            table.insert(resource_url(&self.config.feed.path));
        }
        if self.config.sitemap.enable {
            table.insert(resource_url(&self.config.sitemap.path));
        }
        table
    }

    fn render_page(&self, page: &PlannedPage<'_>, latest: &[&Item], tags: &Tags<'_>) -> Markup {
        match page.kind {
            PageKind::Home => self.theme.home(latest),
            PageKind::Item(item) => self.theme.item(item),
            PageKind::SectionIndex(section, index) => self.theme.section_index(section, &index),
            PageKind::TagIndex => self.theme.tag_index(tags),
            PageKind::TagDetail(entry) => self.theme.tag_detail(entry),
            PageKind::Custom(page) => self.theme.custom(page),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        content::{item::parse_tags, organize},
        utils::date::DateTimeUtc,
    };
    use std::{path::PathBuf, sync::OnceLock};

    fn config(extra: &str) -> SiteConfig {
        SiteConfig::from_str(&format!(
            r#"
            [base]
            title = "Test"
            description = "Test site"
            url = "https://example.com"

            {extra}

            [[sections]]
            id = "blog"
        "#
        ))
        .unwrap()
    }

    fn item(index: usize, slug: &str, body: &str, tags: &str) -> Item {
        Item {
            title: slug.to_uppercase(),
            description: String::new(),
            body: body.into(),
            date: DateTimeUtc::from_ymd(2024, 1, 1 + index as u8),
            tags: parse_tags(tags),
            section: "blog".into(),
            source: PathBuf::from(format!("content/blog/{slug}.md")),
            slug: slug.into(),
            index,
            rendered: OnceLock::new(),
        }
    }

    fn page(slug: &str, body: &str) -> Page {
        Page {
            title: slug.into(),
            description: String::new(),
            body: body.into(),
            date: DateTimeUtc::from_ymd(2024, 1, 1),
            source: PathBuf::from(format!("content/{slug}.md")),
            slug: slug.into(),
            index: 99,
        }
    }

    fn paths(set: ArtifactSet) -> Vec<String> {
        set.into_sorted()
            .into_iter()
            .map(|a| a.path.to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn test_folder_layout() {
        let config = config("");
        let sections = organize(&config, vec![item(0, "hello", "<p>hi</p>", "swift, hidden:seo")]);
        let pages = [page("about", "<p>me</p>")];
        let set = Renderer::new(&config, &sections, &pages)
            .render(Vec::new())
            .unwrap();

        assert_eq!(set.count(ArtifactKind::Html), 7);
        assert_eq!(
            paths(set),
            [
                "about/index.html",
                "blog/hello/index.html",
                "blog/index.html",
                "index.html",
                "styles.css",
                "tags/hidden-seo/index.html",
                "tags/index.html",
                "tags/swift/index.html",
            ]
        );
    }

    #[test]
    fn test_flat_layout() {
        let config = config("[build]\noutput_mode = \"flat\"");
        let sections = organize(&config, vec![item(0, "hello", "", "")]);
        let set = Renderer::new(&config, &sections, &[]).render(Vec::new()).unwrap();

        assert!(set.contains(Path::new("blog/hello.html")));
        assert!(set.contains(Path::new("blog.html")));
        assert!(set.contains(Path::new("tags.html")));
        assert!(set.contains(Path::new("index.html")));
    }

    #[test]
    fn test_broken_body_link_fails() {
        let config = config("");
        let body = r#"<p><a href="/blog/missing/">gone</a></p>"#;
        let sections = organize(&config, vec![item(0, "hello", body, "")]);
        let err = Renderer::new(&config, &sections, &[])
            .render(Vec::new())
            .unwrap_err();

        match err {
            RenderError::BrokenLink { from, target } => {
                assert_eq!(from, "/blog/hello/");
                assert_eq!(target, "/blog/missing/");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_body_links_to_pages_and_resources_resolve() {
        let config = config("");
        let body = r#"<a href="/blog/other/">o</a><img src="/images/a.png"><a href="/feed.rss">f</a>"#;
        let sections = organize(
            &config,
            vec![item(0, "hello", body, ""), item(1, "other", "", "")],
        );
        let resources = vec![Resource {
            relative: PathBuf::from("images/a.png"),
            bytes: vec![1, 2, 3],
        }];
        let set = Renderer::new(&config, &sections, &[]).render(resources).unwrap();

        let assets = set.of_kind(ArtifactKind::Asset);
        let image = assets
            .iter()
            .find(|a| a.path == Path::new("images/a.png"))
            .unwrap();
        assert_eq!(image.content, [1, 2, 3]);
    }

    #[test]
    fn test_hidden_tag_page_exists_but_not_listed() {
        let config = config("");
        let sections = organize(&config, vec![item(0, "hello", "", "swift, hidden:seo")]);
        let set = Renderer::new(&config, &sections, &[]).render(Vec::new()).unwrap();

        let pages = set.of_kind(ArtifactKind::Html);
        let item_page = pages
            .iter()
            .find(|a| a.path == Path::new("blog/hello/index.html"))
            .unwrap();
        let html = String::from_utf8_lossy(&item_page.content);
        assert!(html.contains("/tags/swift/"));
        assert!(!html.contains("/tags/hidden-seo/"));
        assert!(set.contains(Path::new("tags/hidden-seo/index.html")));
    }

    #[test]
    fn test_page_collides_with_section() {
        let config = config("");
        let sections = organize(&config, Vec::new());
        let pages = [page("blog", "")];
        let err = Renderer::new(&config, &sections, &pages)
            .render(Vec::new())
            .unwrap_err();
        assert!(matches!(err, RenderError::PathCollision(p) if p == Path::new("blog/index.html")));
    }

    #[test]
    fn test_paging_links_resolve() {
        let config = SiteConfig::from_str(
            r#"
            [base]
            title = "Test"
            description = "Test"
            url = "https://example.com"
            [[sections]]
            id = "blog"
            per_page = 1
        "#,
        )
        .unwrap();
        let items = (0..3).map(|i| item(i, &format!("p{i}"), "", "")).collect();
        let sections = organize(&config, items);
        let set = Renderer::new(&config, &sections, &[]).render(Vec::new()).unwrap();

        assert!(set.contains(Path::new("blog/index.html")));
        assert!(set.contains(Path::new("blog/page/2/index.html")));
        assert!(set.contains(Path::new("blog/page/3/index.html")));
    }

    #[test]
    fn test_item_rendered_and_lastmod() {
        let config = config("");
        let sections = organize(&config, vec![item(0, "hello", "<p>body</p>", "")]);
        let set = Renderer::new(&config, &sections, &[]).render(Vec::new()).unwrap();

        let item = &sections.get("blog").unwrap().items[0];
        assert!(item.rendered.get().unwrap().contains("<p>body</p>"));

        let pages = set.of_kind(ArtifactKind::Html);
        let lastmod: Vec<Option<DateTimeUtc>> = pages.iter().map(|a| a.lastmod).collect();
        assert_eq!(lastmod.iter().filter(|d| d.is_some()).count(), 1);
    }

    #[test]
    fn test_asset_stylesheet_overrides_default() {
        let config = config("");
        let sections = organize(&config, Vec::new());
        let resources = vec![Resource {
            relative: PathBuf::from("styles.css"),
            bytes: b"body{}".to_vec(),
        }];
        let set = Renderer::new(&config, &sections, &[]).render(resources).unwrap();
        let assets = set.of_kind(ArtifactKind::Asset);
        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0].content, b"body{}");
    }
}
