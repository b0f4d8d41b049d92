//! RSS feed generation.
//!
//! One RSS 2.0 channel over the items of the feed's sections.

use crate::{
    config::SiteConfig,
    content::{Item, Sections, markdown::excerpt, section::newest_first},
    error::RenderError,
    render::{Artifact, ArtifactKind, links::resource_url},
};
use rss::{CategoryBuilder, ChannelBuilder, GuidBuilder, ItemBuilder, validation::Validate};

/// Build the feed artifact at `[feed] path`.
pub fn build_feed(config: &SiteConfig, sections: &Sections) -> Result<Artifact, RenderError> {
    let feed = &config.feed;
    let path = feed.path.clone();
    let url = resource_url(&path);

    let mut entries: Vec<&Item> = sections
        .iter()
        .filter(|section| feed.includes(&section.id))
        .flat_map(|section| &section.items)
        .collect();
    entries.sort_by(|a, b| newest_first(a, b));
    entries.truncate(feed.limit);

    let items: Vec<rss::Item> = entries
        .into_iter()
        .map(|item| feed_item(item, config))
        .collect();

    let channel = ChannelBuilder::default()
        .title(&config.base.title)
        .link(config.full_url("/"))
        .description(&config.base.description)
        .language(Some(config.base.language.clone()))
        .generator(Some(format!("quire {}", env!("CARGO_PKG_VERSION"))))
        .items(items)
        .build();

    channel.validate().map_err(|err| RenderError::Template {
        page: url.clone(),
        message: format!("rss validation failed: {err}"),
    })?;

    Ok(Artifact::new(
        path,
        url,
        channel.to_string().into_bytes(),
        ArtifactKind::Feed,
    ))
}

fn feed_item(item: &Item, config: &SiteConfig) -> rss::Item {
    let link = config.full_url(&item.url(config.build.output_mode));
    let description = excerpt(&item.description, config.feed.description_length);
    let categories = item
        .visible_tags(&config.build.hidden_tag_prefix)
        .map(|tag| CategoryBuilder::default().name(tag.name.clone()).build())
        .collect::<Vec<_>>();

    ItemBuilder::default()
        .title(Some(item.title.clone()))
        .link(Some(link.clone()))
        .guid(Some(GuidBuilder::default().permalink(true).value(link).build()))
        .pub_date(Some(item.date.to_rfc2822()))
        .description(Some(description.into_owned()))
        .categories(categories)
        .build()
}
