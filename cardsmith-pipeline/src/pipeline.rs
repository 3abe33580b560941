use crate::format::Format;
use crate::generator::Generator;
use crate::navigator::Navigator;
use crate::topic::Topic;
use cardsmith_common::Result;
use tracing::info;

/// A finished deck. `text` is the model's reply, byte for byte.
#[derive(Debug, Clone)]
pub struct GeneratedDeck {
    pub subject: Topic,
    pub format: Format,
    pub source_url: String,
    pub text: String,
}

impl GeneratedDeck {
    /// Lines in the reply, header included.
    pub fn item_count(&self) -> usize {
        self.text.lines().count()
    }
}

/// Navigator → format lookup → Generator, strictly in sequence.
#[derive(Clone)]
pub struct Pipeline {
    navigator: Navigator,
    generator: Generator,
}

impl Pipeline {
    pub fn new(navigator: Navigator, generator: Generator) -> Self {
        Self {
            navigator,
            generator,
        }
    }

    /// Entry point for callers holding raw user input.
    ///
    /// Blank topics fail with `EmptyInput` before any browser is launched;
    /// unknown format ids fall back to the default format.
    pub async fn generate(&self, topic: &str, format_id: &str) -> Result<GeneratedDeck> {
        let subject = Topic::new(topic)?;
        self.run(subject, Format::lookup(format_id)).await
    }

    pub async fn run(&self, subject: Topic, format: Format) -> Result<GeneratedDeck> {
        let page = self.navigator.fetch_subject_page(&subject).await?;
        let text = self.generator.write_cards(&page, format).await?;

        let deck = GeneratedDeck {
            subject: page.subject,
            format,
            source_url: page.url,
            text,
        };
        info!(
            target: "pipeline",
            subject = %deck.subject,
            format = deck.format.name(),
            items = deck.item_count(),
            "generated deck"
        );
        Ok(deck)
    }
}
