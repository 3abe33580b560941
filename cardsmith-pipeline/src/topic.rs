use cardsmith_common::{CardsmithError, Result};
use std::fmt;
use std::str::FromStr;

/// The subject to study: a trimmed, non-empty string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Topic(String);

impl Topic {
    /// Trim `raw` and reject it if nothing is left.
    ///
    /// ```
    /// use cardsmith_pipeline::Topic;
    ///
    /// assert_eq!(Topic::new("  World War II ").unwrap().as_str(), "World War II");
    /// assert!(Topic::new(" \t").is_err());
    /// ```
    pub fn new(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CardsmithError::EmptyInput);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Topic {
    type Err = CardsmithError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl AsRef<str> for Topic {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
