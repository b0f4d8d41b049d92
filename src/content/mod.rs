//! Content model: reading markdown sources, building items, and organizing
//! them into sections.

pub mod front_matter;
pub mod item;
pub mod markdown;
pub mod reader;
pub mod section;

pub use item::{Content, Item, ItemBuilder, Page, Tag};
pub use markdown::{CodeBlockProcessor, PlainCodeBlocks};
pub use reader::{ContentReader, RawContent, Resource};
pub use section::{IndexPage, Section, Sections, TagEntry, organize};
