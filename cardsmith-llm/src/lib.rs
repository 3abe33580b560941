//! Provider‑agnostic LLM integration for Cardsmith.
//!
//! This crate exposes a common [`traits::LlmClient`] interface and the
//! Gemini implementation used to turn scraped text into flashcards.
//!
//! # Examples
//! ```no_run
//! use cardsmith_common::Result;
//! use cardsmith_llm::{ensure_llm_ready, gemini::GeminiSettings, LlmConfig};
//!
//! # fn main() -> Result<()> {
//! let client = ensure_llm_ready(&LlmConfig::Gemini(GeminiSettings::default()))?;
//! assert_eq!(client.model_name(), "gemini-2.5-pro");
//! # Ok(())
//! # }
//! ```
#[cfg(feature = "gemini")]
pub mod gemini;
pub mod traits;

use cardsmith_common::{CardsmithError, Result};
#[cfg(feature = "gemini")]
use gemini::{GeminiClient, GeminiSettings};
use std::sync::Arc;
use traits::LlmClient;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-pro";

/// Which provider to build and how to reach it.
#[derive(Debug, Clone)]
pub enum LlmConfig {
    #[cfg(feature = "gemini")]
    Gemini(GeminiSettings),
    None,
}

/// Build a shareable client for `config`.
pub fn ensure_llm_ready(config: &LlmConfig) -> Result<Arc<dyn LlmClient + Send + Sync + 'static>> {
    match config {
        #[cfg(feature = "gemini")]
        LlmConfig::Gemini(settings) => {
            let client = GeminiClient::new(settings.clone())?;
            Ok(Arc::new(client))
        }
        LlmConfig::None => Err(CardsmithError::Config("No LLM configured".to_string())),
    }
}
