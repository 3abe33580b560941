//! Writing a deck to disk. The file holds the reply verbatim, UTF-8.
use crate::format::Format;
use crate::pipeline::GeneratedDeck;
use crate::topic::Topic;
use cardsmith_common::Result;
use chrono::{DateTime, Local, TimeZone};
use std::io;
use std::path::{Path, PathBuf};

/// `{topic}_{format}_{YYYYmmdd_HHMMSS}.csv`
pub fn deck_file_name<Tz: TimeZone>(subject: &Topic, format: Format, at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let subject: String = subject
        .as_str()
        .chars()
        .map(|c| {
            if c.is_whitespace() || c == '/' || c == '\\' {
                '_'
            } else {
                c
            }
        })
        .collect();
    format!(
        "{}_{}_{}.csv",
        subject,
        format.name().to_lowercase(),
        at.format("%Y%m%d_%H%M%S")
    )
}

/// Save `deck` under `dir`, stamped with the current local time.
pub fn save_deck(dir: &Path, deck: &GeneratedDeck) -> Result<PathBuf> {
    save_deck_at(dir, deck, &Local::now())
}

pub fn save_deck_at<Tz: TimeZone>(
    dir: &Path,
    deck: &GeneratedDeck,
    at: &DateTime<Tz>,
) -> Result<PathBuf>
where
    Tz::Offset: std::fmt::Display,
{
    if deck.text.is_empty() {
        return Err(io::Error::new(io::ErrorKind::InvalidInput, "deck is empty; nothing to save").into());
    }
    std::fs::create_dir_all(dir)?;
    let path = dir.join(deck_file_name(&deck.subject, deck.format, at));
    std::fs::write(&path, deck.text.as_bytes())?;
    tracing::info!(target: "pipeline", path = %path.display(), "saved deck");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn deck(text: &str) -> GeneratedDeck {
        GeneratedDeck {
            subject: Topic::new("World War II").unwrap(),
            format: Format::Kahoot,
            source_url: "https://www.encyclopedia.com/ww2".into(),
            text: text.into(),
        }
    }

    #[test]
    fn file_name_follows_topic_format_timestamp() {
        let at = Utc.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap();
        let name = deck_file_name(&Topic::new("World War II").unwrap(), Format::Kahoot, &at);
        assert_eq!(name, "World_War_II_kahoot_20260314_092653.csv");
    }

    #[test]
    fn separators_do_not_escape_the_directory() {
        let at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let name = deck_file_name(&Topic::new("AC/DC").unwrap(), Format::Quizlet, &at);
        assert_eq!(name, "AC_DC_quizlet_20260101_000000.csv");
    }

    #[test]
    fn saved_file_is_the_reply_verbatim() {
        let tmp = tempfile::tempdir().unwrap();
        let text = "Question - Answer 1 - ...\nWho? - A - B - C - D - 20 - 1\n";
        let at = Utc.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap();

        let path = save_deck_at(tmp.path(), &deck(text), &at).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), text);
        assert!(path.starts_with(tmp.path()));
    }

    #[test]
    fn empty_deck_is_refused() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(save_deck(tmp.path(), &deck("")).is_err());
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
    }
}
