use feed_courier::delivery::OutboundMessage;
use std::path::Path;

/// Builds an RSS 2.0 document from `(guid, link, title)` triples
pub fn rss(items: &[(&str, &str, &str)]) -> String {
    let mut body = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Test feed</title>
    <link>https://example.com/</link>
    <description>Items for tests</description>
"#,
    );

    for (guid, link, title) in items {
        body.push_str("    <item>\n");
        body.push_str(&format!("      <title>{}</title>\n", title));
        body.push_str(&format!("      <link>{}</link>\n", link));
        if !guid.is_empty() {
            body.push_str(&format!("      <guid>{}</guid>\n", guid));
        }
        body.push_str("    </item>\n");
    }

    body.push_str("  </channel>\n</rss>\n");
    body
}

/// Reads every staged message in `dir`, skipping hidden files
pub fn staged_messages(dir: &Path) -> Vec<OutboundMessage> {
    let mut messages: Vec<OutboundMessage> = std::fs::read_dir(dir)
        .expect("Failed to read drop directory")
        .map(|entry| entry.expect("Failed to read directory entry").path())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .map_or(false, |n| !n.starts_with('.'))
        })
        .map(|path| {
            let body = std::fs::read(&path).expect("Failed to read message file");
            serde_json::from_slice(&body).expect("Message file is not valid JSON")
        })
        .collect();

    messages.sort_by(|a, b| a.caption.cmp(&b.caption));
    messages
}
