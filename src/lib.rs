//! quire - a static blog builder.
//!
//! Markdown content with front-matter goes in; HTML pages, an RSS feed, a
//! sitemap and copied assets come out, optionally committed and pushed to a
//! git hosting branch.
//!
//! The [`pipeline::Pipeline`] runs the stages in order:
//!
//! | Stage     | Module                                  |
//! |-----------|-----------------------------------------|
//! | read      | [`content::reader`]                     |
//! | build     | [`content::item`], [`content::section`] |
//! | render    | [`render`]                              |
//! | feed      | [`generator`]                           |
//! | publish   | [`deploy`]                              |

pub mod cli;
pub mod config;
pub mod content;
pub mod deploy;
pub mod error;
pub mod generator;
pub mod pipeline;
pub mod render;
pub mod utils;
