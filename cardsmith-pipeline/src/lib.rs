//! Scrape‑then‑generate pipeline.
//!
//! A caller hands in a topic and a format id; the pipeline
//!
//! 1. drives a browser through a [`script::NavigationScript`] to the topic's
//!    article and captures its text ([`navigator::Navigator`]),
//! 2. looks the format up in the closed [`format::Format`] catalog,
//! 3. composes one prompt and returns the model's reply untouched
//!    ([`generator::Generator`]).
//!
//! Every invocation owns its own browser session; nothing is shared between
//! concurrent runs and nothing is retried.
//!
//! [`persist`] writes a finished deck to disk for callers that want a file.
pub mod format;
pub mod generator;
pub mod navigator;
pub mod page;
pub mod persist;
pub mod pipeline;
pub mod script;
pub mod topic;

pub use format::Format;
pub use generator::Generator;
pub use navigator::Navigator;
pub use page::PageData;
pub use pipeline::{GeneratedDeck, Pipeline};
pub use script::{NavStep, NavigationScript};
pub use topic::Topic;
