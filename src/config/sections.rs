//! `[[sections]]` configuration.
//!
//! The declared sections are the closed set of section identifiers a
//! content file may belong to.

use serde::{Deserialize, Serialize};

/// Field a section's items are ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    #[default]
    Date,
    Title,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// One `[[sections]]` entry.
///
/// # Example
/// ```toml
/// [[sections]]
/// id = "posts"
/// title = "Posts"
/// sort = "date"
/// order = "descending"
/// per_page = 10
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SectionConfig {
    /// Identifier, also the section's URL path segment.
    pub id: String,

    /// Display title (defaults to the capitalized id).
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub sort: SortField,

    /// Defaults to descending for dates and ascending for titles.
    #[serde(default)]
    pub order: Option<SortOrder>,

    /// Items per index page; only honoured in folder output mode.
    #[serde(default)]
    pub per_page: Option<usize>,
}

impl SectionConfig {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_owned(),
            title: None,
            sort: SortField::default(),
            order: None,
            per_page: None,
        }
    }

    pub fn display_title(&self) -> String {
        match &self.title {
            Some(title) => title.clone(),
            None => {
                let mut chars = self.id.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            }
        }
    }

    pub fn effective_order(&self) -> SortOrder {
        self.order.unwrap_or(match self.sort {
            SortField::Date => SortOrder::Descending,
            SortField::Title => SortOrder::Ascending,
        })
    }
}
