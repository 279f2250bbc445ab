use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub name: String,

    /// Relative to the data directory.
    pub path: String,

    #[serde(default)]
    pub size: u64,

    #[serde(default)]
    pub sha256: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Dataset {
    pub id: u64,

    #[serde(default)]
    pub title: String,

    pub source_file: StoredFile,

    #[serde(default, alias = "source_lang")]
    pub source_language: String,

    #[serde(default)]
    pub target_file: Option<StoredFile>,

    #[serde(default, alias = "target_lang")]
    pub target_language: Option<String>,

    #[serde(default)]
    pub sentence_count: usize,
}

impl Dataset {
    pub fn language_pair(&self) -> (&str, Option<&str>) {
        (self.source_language.as_str(), self.target_language.as_deref())
    }
}
