//! RSS/Atom document parsing
//!
//! Turns a raw feed document into the ordered list of [`FeedItem`]s the
//! dedup logic works on.

use crate::ingest::FeedItem;
use feed_rs::parser::{Builder, ParseFeedError};

/// Parses a feed document into items, keeping document order
///
/// Entries without an identifier get an empty raw id (instead of a synthesized
/// hash) so that [`FeedItem::identifier`] falls back to their link.
pub fn parse_feed(body: &[u8]) -> Result<Vec<FeedItem>, ParseFeedError> {
    let parser = Builder::new()
        .id_generator(|_links, _title, _uri| String::new())
        .build();
    let feed = parser.parse(body)?;

    let items = feed
        .entries
        .into_iter()
        .map(|entry| {
            let link = entry
                .links
                .first()
                .map(|l| l.href.clone())
                .unwrap_or_default();
            let title = entry.title.map(|t| t.content).unwrap_or_default();
            FeedItem {
                guid: entry.id,
                link,
                title,
            }
        })
        .collect();

    Ok(items)
}
