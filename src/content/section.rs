//! Section organizer.
//!
//! Groups items by declared section and orders them. Sorting is stable with
//! read order as the final tie-breaker, so organizing is deterministic.

use super::item::{Item, Tag};
use crate::config::{OutputMode, SiteConfig, SortField, SortOrder};
use std::{cmp::Ordering, collections::BTreeMap};

#[derive(Debug, Clone)]
pub struct Section {
    pub id: String,
    pub title: String,
    pub items: Vec<Item>,
    per_page: Option<usize>,
}

/// One index page of a section.
#[derive(Debug, Clone, Copy)]
pub struct IndexPage<'a> {
    /// 1-based.
    pub number: usize,
    pub total: usize,
    pub items: &'a [Item],
}

impl Section {
    /// Split the ordered items into index pages.
    ///
    /// Paging applies only to folder output; otherwise, and for an empty
    /// section, there is exactly one page.
    pub fn pages(&self, mode: OutputMode) -> Vec<IndexPage<'_>> {
        let per_page = match (mode, self.per_page) {
            (OutputMode::Folder, Some(n)) if n > 0 && self.items.len() > n => n,
            _ => {
                return vec![IndexPage {
                    number: 1,
                    total: 1,
                    items: &self.items,
                }];
            }
        };

        let total = self.items.len().div_ceil(per_page);
        self.items
            .chunks(per_page)
            .enumerate()
            .map(|(i, items)| IndexPage {
                number: i + 1,
                total,
                items,
            })
            .collect()
    }

    /// `posts` for page 1, `posts/page/N` after that.
    pub fn page_rel_path(&self, number: usize) -> String {
        if number <= 1 {
            self.id.clone()
        } else {
            format!("{}/page/{number}", self.id)
        }
    }
}

/// A tag together with every item carrying it.
#[derive(Debug, Clone)]
pub struct TagEntry<'a> {
    /// First occurrence in newest-first order.
    pub tag: &'a Tag,
    pub items: Vec<&'a Item>,
}

/// All declared sections, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct Sections {
    sections: Vec<Section>,
}

impl Sections {
    pub fn iter(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter()
    }

    pub fn get(&self, id: &str) -> Option<&Section> {
        self.sections.iter().find(|section| section.id == id)
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn item_count(&self) -> usize {
        self.sections.iter().map(|s| s.items.len()).sum()
    }

    /// Items of every section, newest first; ties keep read order.
    pub fn latest(&self) -> Vec<&Item> {
        let mut items: Vec<&Item> = self.sections.iter().flat_map(|s| &s.items).collect();
        items.sort_by(|a, b| newest_first(a, b));
        items
    }

    /// Tags keyed by normalized key, hidden ones included.
    pub fn tags(&self) -> BTreeMap<&str, TagEntry<'_>> {
        let mut tags: BTreeMap<&str, TagEntry<'_>> = BTreeMap::new();
        for item in self.latest() {
            for tag in &item.tags {
                tags.entry(tag.key.as_str())
                    .or_insert_with(|| TagEntry {
                        tag,
                        items: Vec::new(),
                    })
                    .items
                    .push(item);
            }
        }
        tags
    }
}

/// Newest first, ties broken by read order.
pub fn newest_first(a: &Item, b: &Item) -> Ordering {
    b.date.cmp(&a.date).then(a.index.cmp(&b.index))
}

/// Group `items` into the declared sections and sort each one.
pub fn organize(config: &SiteConfig, items: Vec<Item>) -> Sections {
    let mut sections: Vec<Section> = config
        .sections
        .iter()
        .map(|declared| Section {
            id: declared.id.clone(),
            title: declared.display_title(),
            items: Vec::new(),
            per_page: declared.per_page,
        })
        .collect();

    let mut items = items;
    items.sort_by_key(|item| item.index);
    for item in items {
        if let Some(section) = sections.iter_mut().find(|s| s.id == item.section) {
            section.items.push(item);
        }
    }

    for (section, declared) in sections.iter_mut().zip(&config.sections) {
        let order = declared.effective_order();
        section.items.sort_by(|a, b| {
            let ord = match declared.sort {
                SortField::Date => a.date.cmp(&b.date),
                SortField::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
            };
            match order {
                SortOrder::Ascending => ord,
                SortOrder::Descending => ord.reverse(),
            }
        });
    }

    Sections { sections }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{content::item::parse_tags, utils::date::DateTimeUtc};
    use std::{path::PathBuf, sync::OnceLock};

    fn config(extra: &str) -> SiteConfig {
        SiteConfig::from_str(&format!(
            r#"
            [base]
            title = "Test"
            description = "Test"
            url = "https://example.com"

            [[sections]]
            id = "blog"
            {extra}

            [[sections]]
            id = "empty"
        "#
        ))
        .unwrap()
    }

    fn item(index: usize, title: &str, ymd: (u16, u8, u8), tags: &str) -> Item {
        Item {
            title: title.into(),
            description: String::new(),
            body: String::new(),
            date: DateTimeUtc::from_ymd(ymd.0, ymd.1, ymd.2),
            tags: parse_tags(tags),
            section: "blog".into(),
            source: PathBuf::from(format!("content/blog/{index}.md")),
            slug: format!("p{index}"),
            index,
            rendered: OnceLock::new(),
        }
    }

    fn titles(section: &Section) -> Vec<&str> {
        section.items.iter().map(|i| i.title.as_str()).collect()
    }

    #[test]
    fn test_every_declared_section_exists() {
        let sections = organize(&config(""), vec![item(0, "A", (2024, 1, 1), "")]);
        let ids: Vec<&str> = sections.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["blog", "empty"]);
        assert!(sections.get("empty").unwrap().items.is_empty());
        assert_eq!(sections.get("blog").unwrap().title, "Blog");
        assert_eq!(sections.item_count(), 1);
    }

    #[test]
    fn test_date_descending_is_stable() {
        let items = vec![
            item(2, "Third", (2024, 1, 1), ""),
            item(0, "First", (2024, 1, 1), ""),
            item(1, "Newer", (2024, 2, 1), ""),
            item(3, "Fourth", (2024, 1, 1), ""),
        ];
        let sections = organize(&config(""), items.clone());
        let blog = sections.get("blog").unwrap();
        assert_eq!(titles(blog), ["Newer", "First", "Third", "Fourth"]);

        // Idempotent regardless of input order
        let mut reversed = items;
        reversed.reverse();
        let again = organize(&config(""), reversed);
        assert_eq!(titles(again.get("blog").unwrap()), titles(blog));
    }

    #[test]
    fn test_title_ascending() {
        let items = vec![
            item(0, "banana", (2024, 3, 1), ""),
            item(1, "Apple", (2024, 1, 1), ""),
            item(2, "cherry", (2024, 2, 1), ""),
        ];
        let sections = organize(&config(r#"sort = "title""#), items);
        assert_eq!(titles(sections.get("blog").unwrap()), ["Apple", "banana", "cherry"]);
    }

    #[test]
    fn test_date_ascending_override() {
        let items = vec![
            item(0, "Feb", (2024, 2, 1), ""),
            item(1, "Jan", (2024, 1, 1), ""),
        ];
        let sections = organize(&config(r#"order = "ascending""#), items);
        assert_eq!(titles(sections.get("blog").unwrap()), ["Jan", "Feb"]);
    }

    #[test]
    fn test_paging_in_folder_mode_only() {
        let items: Vec<Item> = (0..5)
            .map(|i| item(i, &format!("P{i}"), (2024, 1, 1 + i as u8), ""))
            .collect();
        let sections = organize(&config("per_page = 2"), items);
        let blog = sections.get("blog").unwrap();

        let pages = blog.pages(OutputMode::Folder);
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0].items.len(), 2);
        assert_eq!(pages[2].items.len(), 1);
        assert_eq!(pages[2].total, 3);
        assert_eq!(blog.page_rel_path(1), "blog");
        assert_eq!(blog.page_rel_path(3), "blog/page/3");

        assert_eq!(blog.pages(OutputMode::Flat).len(), 1);
        assert_eq!(sections.get("empty").unwrap().pages(OutputMode::Folder).len(), 1);
    }

    #[test]
    fn test_tags_collect_items_newest_first() {
        let items = vec![
            item(0, "Old", (2024, 1, 1), "Swift, hidden:seo"),
            item(1, "New", (2024, 2, 1), "swift"),
        ];
        let sections = organize(&config(""), items);
        let tags = sections.tags();

        let keys: Vec<&str> = tags.keys().copied().collect();
        assert_eq!(keys, ["hidden-seo", "swift"]);

        let swift = &tags["swift"];
        assert_eq!(swift.tag.name, "swift");
        let titles: Vec<&str> = swift.items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, ["New", "Old"]);
    }
}
