//! Feed and sitemap generation.
//!
//! Both are pure derivations of the run's model and return artifacts; the
//! pipeline writes them with everything else.

pub mod rss;
pub mod sitemap;

pub use rss::build_feed;
pub use sitemap::build_sitemap;
