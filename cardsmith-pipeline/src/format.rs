//! The closed catalog of flashcard import formats.
//!
//! Instruction blocks are sent to the model verbatim; the model is told to
//! match them exactly, so they must not be reflowed or escaped.
use std::fmt;

pub const KAHOOT_HEADER: &str = "Question - Answer 1 - Answer 2 - Answer 3 - Answer 4 - Time limit (5,10,20,30,60,90 or 120) - Correct answer(s)";
pub const GIMKIT_HEADER: &str = "Question,Incorrect Answer 1,Incorrect Answer 2,Incorrect Answer 3";

const QUIZLET_INSTRUCTION: &str = "Format the output EXACTLY as follows for Quizlet import:
- Each flashcard on a new line
- Format: term, definition
- Use a comma to separate term and definition";

const KAHOOT_INSTRUCTION: &str = "YOU MUST START WITH THIS EXACT HEADER LINE, this should be the first row (copy it exactly):
Question - Answer 1 - Answer 2 - Answer 3 - Answer 4 - Time limit (5,10,20,30,60,90 or 120) - Correct answer(s)";

const GIMKIT_INSTRUCTION: &str = "Format the output EXACTLY as follows for Gimkit import (CSV format):
Question,Incorrect Answer 1,Incorrect Answer 2,Incorrect Answer 3";

/// Kahoot only accepts these per-question time limits, in seconds.
pub const KAHOOT_TIME_LIMITS: [u32; 7] = [5, 10, 20, 30, 60, 90, 120];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// `term, definition` lines, no header.
    Quizlet,
    /// Fixed header, then dash-delimited question rows.
    Kahoot,
    /// CSV with a fixed header of a question and three distractors.
    Gimkit,
}

impl Format {
    pub const ALL: [Format; 3] = [Format::Quizlet, Format::Kahoot, Format::Gimkit];
    pub const DEFAULT: Format = Format::Quizlet;

    pub fn id(self) -> &'static str {
        match self {
            Format::Quizlet => "1",
            Format::Kahoot => "2",
            Format::Gimkit => "3",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Format::Quizlet => "Quizlet",
            Format::Kahoot => "Kahoot",
            Format::Gimkit => "Gimkit",
        }
    }

    pub fn instruction(self) -> &'static str {
        match self {
            Format::Quizlet => QUIZLET_INSTRUCTION,
            Format::Kahoot => KAHOOT_INSTRUCTION,
            Format::Gimkit => GIMKIT_INSTRUCTION,
        }
    }

    /// The header row the import tool requires, if any.
    pub fn header_line(self) -> Option<&'static str> {
        match self {
            Format::Quizlet => None,
            Format::Kahoot => Some(KAHOOT_HEADER),
            Format::Gimkit => Some(GIMKIT_HEADER),
        }
    }

    /// Look a format up by id. Unknown ids resolve to [`Format::DEFAULT`].
    ///
    /// ```
    /// use cardsmith_pipeline::Format;
    ///
    /// assert_eq!(Format::lookup("2"), Format::Kahoot);
    /// assert_eq!(Format::lookup("kahoot"), Format::Quizlet);
    /// ```
    pub fn lookup(id: &str) -> Format {
        Self::ALL
            .into_iter()
            .find(|f| f.id() == id)
            .unwrap_or(Self::DEFAULT)
    }

    /// Case-insensitive match on the display name.
    pub fn from_name(name: &str) -> Option<Format> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|f| f.name().eq_ignore_ascii_case(name))
    }

    /// Accept an id or a name; anything else falls back to the default.
    ///
    /// The fallback can hide a typo, so it is logged.
    pub fn resolve(id_or_name: &str) -> Format {
        let wanted = id_or_name.trim();
        if let Some(format) = Self::ALL.into_iter().find(|f| f.id() == wanted) {
            return format;
        }
        if let Some(format) = Self::from_name(wanted) {
            return format;
        }
        tracing::warn!(
            target: "pipeline",
            requested = %id_or_name,
            fallback = Self::DEFAULT.name(),
            "unknown format; using default"
        );
        Self::DEFAULT
    }
}

impl Default for Format {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
