use std::fmt::Display;

use chrono::{DateTime, TimeZone};

use crate::config::JobConfig;
use crate::db::Word;

const TRANSLATE_BASE: &str = "https://translate.google.com/";
const DIVIDER: &str = "-----";
const HEADER_TIME_FORMAT: &str = "%d/%m/%Y %H:%M";
const CLOSING_LINE: &str = "Fight the good fight!";

/// Renders a batch of words into the daily message. Pure: every input,
/// including the time, is passed in.
#[derive(Debug, Clone)]
pub struct MessageFormatter {
    source_lang: String,
    target_lang: String,
}

impl Default for MessageFormatter {
    fn default() -> Self {
        Self::new("en", "vi")
    }
}

impl MessageFormatter {
    pub fn new(source_lang: impl Into<String>, target_lang: impl Into<String>) -> Self {
        Self {
            source_lang: source_lang.into(),
            target_lang: target_lang.into(),
        }
    }

    pub fn from_config(config: &JobConfig) -> Self {
        Self::new(&config.translate_source, &config.translate_target)
    }

    pub fn translate_url(&self, term: &str) -> String {
        format!(
            "{TRANSLATE_BASE}?sl={}&tl={}&text={}",
            self.source_lang,
            self.target_lang,
            urlencoding::encode(term)
        )
    }

    pub fn render_line(&self, idx: usize, word: &Word) -> String {
        let mut line = format!(
            "**{idx} - {}**: {} {}",
            word.term,
            word.meaning_vi,
            self.translate_url(&word.term)
        );
        if let Some(example) = word.first_example() {
            line.push_str(&format!("\nExamples: {example}"));
        }
        line.push('\n');
        line.push_str(DIVIDER);
        line
    }

    pub fn format<Tz>(&self, words: &[Word], used_so_far: u64, now: &DateTime<Tz>) -> String
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let vocab_list = words
            .iter()
            .enumerate()
            .map(|(i, word)| self.render_line(i + 1, word))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "\n\n📚 **Daily Vocabulary - {}** 📚\n\n{vocab_list}\n\n📝 *You have learned {used_so_far} words so far!*\n{CLOSING_LINE}",
            now.format(HEADER_TIME_FORMAT)
        )
    }
}
