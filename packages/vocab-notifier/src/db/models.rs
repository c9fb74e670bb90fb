use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Word {
    pub id: String,
    pub term: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub word_type: Option<String>,
    pub meaning_vi: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(default)]
    pub examples: Vec<Example>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_used: Option<DateTime<Utc>>,
}

impl Word {
    pub fn first_example(&self) -> Option<&str> {
        self.examples.first().map(|e| e.en.as_str())
    }
}

/// Example sentence. Keys other than `en` are carried through untouched.
/// A bare JSON string is read as the `en` sentence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoredExample")]
pub struct Example {
    pub en: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredExample {
    Text(String),
    Object(ExampleObject),
}

#[derive(Deserialize)]
struct ExampleObject {
    #[serde(default)]
    en: String,
    #[serde(flatten)]
    extra: serde_json::Map<String, serde_json::Value>,
}

impl From<StoredExample> for Example {
    fn from(stored: StoredExample) -> Self {
        match stored {
            StoredExample::Text(en) => Example::new(en),
            StoredExample::Object(ExampleObject { en, extra }) => Example { en, extra },
        }
    }
}

impl Example {
    pub fn new(en: impl Into<String>) -> Self {
        Self {
            en: en.into(),
            extra: serde_json::Map::new(),
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct WordRow {
    id: String,
    term: String,
    #[sqlx(rename = "type")]
    word_type: Option<String>,
    #[sqlx(rename = "meaningVi")]
    meaning_vi: String,
    tags: Json<Vec<String>>,
    level: Option<String>,
    examples: Json<Vec<Example>>,
    #[sqlx(rename = "lastUsed")]
    last_used: Option<DateTime<Utc>>,
}

impl From<WordRow> for Word {
    fn from(row: WordRow) -> Self {
        Self {
            id: row.id,
            term: row.term,
            word_type: row.word_type,
            meaning_vi: row.meaning_vi,
            tags: row.tags.0,
            level: row.level,
            examples: row.examples.0,
            last_used: row.last_used,
        }
    }
}

pub(crate) const WORD_COLUMNS: &str =
    r#""id", "term", "type", "meaningVi", "tags", "level", "examples", "lastUsed""#;
