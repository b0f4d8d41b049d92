//! Default theme.
//!
//! One function per page kind, all sharing [`Theme::document`] for the head,
//! navigation and footer. Every link is built from the output mode, so the
//! theme never emits a URL the renderer did not plan.

use super::links::resource_url;
use crate::{
    config::{OutputMode, SiteConfig},
    content::{IndexPage, Item, Page, Section, Sections, TagEntry, item::Tag, markdown::excerpt},
    utils::date::DateTimeUtc,
};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::collections::BTreeMap;

/// Length of `<meta name="description">` text.
const META_DESCRIPTION_CHARS: usize = 160;

/// Stylesheet written to `/styles.css` unless the assets provide one.
pub const STYLESHEET_PATH: &str = "styles.css";

pub const STYLESHEET: &str = "\
body{max-width:42rem;margin:0 auto;padding:1rem;font-family:system-ui,sans-serif;line-height:1.6;color:#222}
a{color:#0b5cad}
header.site-header{display:flex;justify-content:space-between;align-items:baseline;border-bottom:1px solid #ddd}
header.site-header nav a{margin-left:1rem}
.item-list{list-style:none;padding:0}
.item-list article{margin-bottom:2rem}
.tag-list{list-style:none;padding:0;display:flex;flex-wrap:wrap;gap:.5rem}
.tag-list li{background:#eef;border-radius:.25rem;padding:0 .5rem}
pre{overflow-x:auto;background:#f6f8fa;padding:.75rem}
footer{border-top:1px solid #ddd;margin-top:3rem;font-size:.9rem;color:#555}
";

struct NavLink {
    id: String,
    title: String,
    url: String,
}

/// Per-page values for the shared document head.
struct Head<'a> {
    /// `None` on the home page, which uses the site title alone.
    title: Option<&'a str>,
    description: &'a str,
    url: &'a str,
}

pub struct Theme<'a> {
    config: &'a SiteConfig,
    mode: OutputMode,
    nav: Vec<NavLink>,
    /// `None` when the feed is disabled.
    feed_url: Option<String>,
    year: i32,
}

impl<'a> Theme<'a> {
    pub fn new(config: &'a SiteConfig, sections: &Sections) -> Self {
        let mode = config.build.output_mode;
        let nav = sections
            .iter()
            .map(|section| NavLink {
                id: section.id.clone(),
                title: section.title.clone(),
                url: mode.url(&section.page_rel_path(1)),
            })
            .collect();

        let feed_url = config
            .feed
            .enable
            .then(|| resource_url(&config.feed.path));

        Self {
            config,
            mode,
            nav,
            feed_url,
            year: DateTimeUtc::current_year(),
        }
    }

    // ------------------------------------------------------------------------
    // Page kinds
    // ------------------------------------------------------------------------

    pub fn home(&self, items: &[&Item]) -> Markup {
        let base = &self.config.base;
        let content = html! {
            h1 { (base.title) }
            p.description { (base.description) }
            h2 { "Latest content" }
            (self.item_list(items.iter().copied()))
        };
        let head = Head {
            title: None,
            description: &base.description,
            url: "/",
        };
        self.document(&head, content)
    }

    pub fn item(&self, item: &Item) -> Markup {
        let url = item.url(self.mode);
        let description = excerpt(&item.description, META_DESCRIPTION_CHARS);
        let content = html! {
            article.item {
                h1 { (item.title) }
                p.meta {
                    (self.date(item.date))
                    @if let Some(section) = self.nav.iter().find(|nav| nav.id == item.section) {
                        " in "
                        a href=(section.url) { (section.title) }
                    }
                }
                (self.tag_list(item))
                div.content { (PreEscaped(&item.body)) }
            }
        };
        let head = Head {
            title: Some(&item.title),
            description: &description,
            url: &url,
        };
        self.document(&head, content)
    }

    pub fn section_index(&self, section: &Section, page: &IndexPage<'_>) -> Markup {
        let url = self.mode.url(&section.page_rel_path(page.number));
        let content = html! {
            h1 { (section.title) }
            @if section.items.is_empty() {
                p.empty { "Nothing here yet." }
            }
            (self.item_list(page.items))
            @if page.total > 1 {
                nav.pagination {
                    @if page.number > 1 {
                        a rel="prev" href=(self.mode.url(&section.page_rel_path(page.number - 1))) { "Newer" }
                    }
                    span { "Page " (page.number) " of " (page.total) }
                    @if page.number < page.total {
                        a rel="next" href=(self.mode.url(&section.page_rel_path(page.number + 1))) { "Older" }
                    }
                }
            }
        };
        let title = if page.number > 1 {
            format!("{} (page {})", section.title, page.number)
        } else {
            section.title.clone()
        };
        let description = format!("{} on {}", section.title, self.config.base.title);
        let head = Head {
            title: Some(&title),
            description: &description,
            url: &url,
        };
        self.document(&head, content)
    }

    pub fn tag_index(&self, tags: &BTreeMap<&str, TagEntry<'_>>) -> Markup {
        let prefix = &self.config.build.hidden_tag_prefix;
        let content = html! {
            h1 { "Browse all tags" }
            ul.tag-list.all-tags {
                @for entry in tags.values().filter(|entry| !entry.tag.is_hidden(prefix)) {
                    li {
                        a href=(self.tag_url(entry.tag)) { (entry.tag.name) }
                        " (" (entry.items.len()) ")"
                    }
                }
            }
        };
        let url = self.mode.url("tags");
        let description = format!("Tags on {}", self.config.base.title);
        let head = Head {
            title: Some("Tags"),
            description: &description,
            url: &url,
        };
        self.document(&head, content)
    }

    pub fn tag_detail(&self, entry: &TagEntry<'_>) -> Markup {
        let tags_url = self.mode.url("tags");
        let content = html! {
            h1 {
                "Tagged with "
                span.tag { (entry.tag.name) }
            }
            a.browse-all href=(tags_url) { "Browse all tags" }
            (self.item_list(entry.items.iter().copied()))
        };
        let url = self.tag_url(entry.tag);
        let title = format!("Tagged with {}", entry.tag.name);
        let head = Head {
            title: Some(&title),
            description: &title,
            url: &url,
        };
        self.document(&head, content)
    }

    pub fn custom(&self, page: &Page) -> Markup {
        let url = self.mode.url(&page.rel_path());
        let description = excerpt(&page.description, META_DESCRIPTION_CHARS);
        let content = html! {
            article.page {
                div.content { (PreEscaped(&page.body)) }
            }
        };
        let head = Head {
            title: Some(&page.title),
            description: &description,
            url: &url,
        };
        self.document(&head, content)
    }

    // ------------------------------------------------------------------------
    // Shared components
    // ------------------------------------------------------------------------

    fn document(&self, page: &Head<'_>, content: Markup) -> Markup {
        let base = &self.config.base;
        html! {
            (DOCTYPE)
            html lang=(base.language) {
                (self.head(page))
                body {
                    (self.header())
                    main { (content) }
                    (self.footer())
                }
            }
        }
    }

    fn head(&self, page: &Head<'_>) -> Markup {
        let base = &self.config.base;
        let title = match page.title {
            Some(title) => format!("{title} | {}", base.title),
            None => base.title.clone(),
        };
        let canonical = self.config.full_url(page.url);
        let image = base.image.as_deref().map(|path| self.config.full_url(path));
        let social = base.social.as_ref();
        let card = social.map_or("summary", |social| social.card.as_str());

        html! {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                meta name="description" content=(page.description);
                link rel="canonical" href=(canonical);
                link rel="stylesheet" href={ "/" (STYLESHEET_PATH) };
                @if let Some(favicon) = &base.favicon {
                    link rel="shortcut icon" href=(favicon) type="image/png";
                }
                @if let Some(feed_url) = &self.feed_url {
                    link rel="alternate" type="application/rss+xml" title=(base.title) href=(feed_url);
                }
                meta property="og:site_name" content=(base.title);
                meta property="og:title" content=(title);
                meta property="og:description" content=(page.description);
                meta property="og:url" content=(canonical);
                meta name="twitter:card" content=(card);
                meta name="twitter:title" content=(title);
                meta name="twitter:description" content=(page.description);
                @if let Some(handle) = social.and_then(|social| social.twitter.as_deref()) {
                    meta name="twitter:site" content=(handle);
                }
                @if let Some(image) = &image {
                    meta property="og:image" content=(image);
                    meta name="twitter:image" content=(image);
                }
            }
        }
    }

    fn header(&self) -> Markup {
        html! {
            header.site-header {
                a.site-name href="/" { (self.config.base.title) }
                nav {
                    @for link in &self.nav {
                        a href=(link.url) { (link.title) }
                    }
                }
            }
        }
    }

    fn footer(&self) -> Markup {
        let base = &self.config.base;
        html! {
            footer {
                p { "Copyright © " (base.author) " " (self.year) }
                p {
                    "Built in "
                    a href="https://www.rust-lang.org/" { "Rust" }
                    " using "
                    a href="https://crates.io/crates/quire" { "quire" }
                    "."
                    @if let Some(feed_url) = &self.feed_url {
                        " "
                        a href=(feed_url) { "RSS feed" }
                    }
                }
            }
        }
    }

    fn item_list<'i>(&self, items: impl IntoIterator<Item = &'i Item>) -> Markup {
        html! {
            ul.item-list {
                @for item in items {
                    li {
                        article {
                            h2 { a href=(item.url(self.mode)) { (item.title) } }
                            p.meta { (self.date(item.date)) }
                            (self.tag_list(item))
                            p { (&*excerpt(&item.description, META_DESCRIPTION_CHARS)) }
                        }
                    }
                }
            }
        }
    }

    /// Tags of `item` without the hidden ones.
    fn tag_list(&self, item: &Item) -> Markup {
        let prefix = &self.config.build.hidden_tag_prefix;
        html! {
            ul.tag-list {
                @for tag in item.visible_tags(prefix) {
                    li { a href=(self.tag_url(tag)) { (tag.name) } }
                }
            }
        }
    }

    fn date(&self, date: DateTimeUtc) -> Markup {
        html! {
            time datetime=(date.ymd()) { (date.display()) }
        }
    }

    fn tag_url(&self, tag: &Tag) -> String {
        self.mode.url(&tag.rel_path())
    }
}
