use crate::format::Format;
use crate::page::PageData;
use cardsmith_common::Result;
use cardsmith_llm::traits::LlmClient;
use std::sync::Arc;
use tracing::{debug, info};

/// Characters of page content included in the prompt.
pub const CONTENT_PREFIX_CHARS: usize = 4000;

/// First [`CONTENT_PREFIX_CHARS`] characters of `content`, cut on a char boundary.
pub fn truncate_content(content: &str) -> &str {
    match content.char_indices().nth(CONTENT_PREFIX_CHARS) {
        Some((idx, _)) => &content[..idx],
        None => content,
    }
}

/// Compose the single prompt sent to the model.
///
/// ```
/// use cardsmith_pipeline::{generator::build_prompt, Format, PageData, Topic};
///
/// let page = PageData {
///     url: "https://www.encyclopedia.com/dinosaurs".into(),
///     content: "Dinosaurs roamed Earth...".into(),
///     subject: Topic::new("Dinosaurs").unwrap(),
/// };
/// let prompt = build_prompt(&page, Format::Quizlet);
/// assert!(prompt.contains("at least 10 questions about Dinosaurs"));
/// assert!(prompt.ends_with("Dinosaurs roamed Earth..."));
/// ```
pub fn build_prompt(page: &PageData, format: Format) -> String {
    format!(
        "You are a quiz writing expert. Create at least 10 questions about {subject} based on the content provided.

{instruction}

Do not include any introductions, explanations, or conclusions. Output ONLY the formatted data ready for import into {name}.

Content to create questions from:
{content}",
        subject = page.subject,
        instruction = format.instruction(),
        name = format.name(),
        content = truncate_content(&page.content),
    )
}

/// Turns captured page text into a flashcard blob for one format.
#[derive(Clone)]
pub struct Generator {
    client: Arc<dyn LlmClient + Send + Sync>,
}

impl Generator {
    pub fn new(client: Arc<dyn LlmClient + Send + Sync>) -> Self {
        Self { client }
    }

    /// One request, no retries; the reply text is returned unmodified.
    pub async fn write_cards(&self, page: &PageData, format: Format) -> Result<String> {
        let prompt = build_prompt(page, format);
        debug!(
            target: "pipeline.generator",
            prompt_chars = prompt.chars().count(),
            "composed prompt"
        );
        info!(
            target: "pipeline.generator",
            subject = %page.subject,
            format = format.name(),
            model = self.client.model_name(),
            "requesting flashcards"
        );

        let response = self.client.generate(&prompt, None, None, None).await?;
        Ok(response.text)
    }
}
