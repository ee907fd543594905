/// Raw identifiers this short or shorter are placeholders and are replaced by the link
const MIN_TRUSTED_ID_LEN: usize = 3;

/// One entry of a parsed feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedItem {
    /// Feed-supplied global identifier (RSS guid / Atom id), possibly empty
    pub guid: String,

    /// Item link
    pub link: String,

    /// Item title
    pub title: String,
}

impl FeedItem {
    pub fn new(guid: impl Into<String>, link: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            guid: guid.into(),
            link: link.into(),
            title: title.into(),
        }
    }

    /// Identifier recorded in the seen-set for this item
    ///
    /// The raw identifier when it is longer than three bytes, the link otherwise.
    pub fn identifier(&self) -> &str {
        if self.guid.len() > MIN_TRUSTED_ID_LEN {
            &self.guid
        } else {
            &self.link
        }
    }

    /// Message body staged for this item
    pub fn caption(&self) -> String {
        format!("{} {}", self.title, self.link)
    }
}
