use crate::topic::Topic;

/// What navigation captured from the topic's article.
#[derive(Debug, Clone)]
pub struct PageData {
    /// Final URL after following the first search result.
    pub url: String,
    /// Full visible body text, untruncated.
    pub content: String,
    pub subject: Topic,
}
