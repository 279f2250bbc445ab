use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Language {
    pub code: String,
    pub name: String,
}

const BUILTIN: &[(&str, &str)] = &[
    ("ar", "Arabic"),
    ("bg", "Bulgarian"),
    ("cs", "Czech"),
    ("da", "Danish"),
    ("de", "German"),
    ("el", "Greek"),
    ("en", "English"),
    ("es", "Spanish"),
    ("et", "Estonian"),
    ("fi", "Finnish"),
    ("fr", "French"),
    ("hu", "Hungarian"),
    ("it", "Italian"),
    ("ja", "Japanese"),
    ("ko", "Korean"),
    ("lt", "Lithuanian"),
    ("lv", "Latvian"),
    ("nl", "Dutch"),
    ("pl", "Polish"),
    ("pt", "Portuguese"),
    ("pt-BR", "Portuguese (Brazil)"),
    ("ro", "Romanian"),
    ("ru", "Russian"),
    ("sk", "Slovak"),
    ("sl", "Slovenian"),
    ("sv", "Swedish"),
    ("tr", "Turkish"),
    ("uk", "Ukrainian"),
    ("zh", "Chinese"),
];

/// Known languages, keyed by code.
#[derive(Debug, Clone)]
pub struct LanguageCatalog {
    languages: BTreeMap<String, Language>,
}

impl LanguageCatalog {
    pub fn builtin() -> Self {
        Self::from_languages(BUILTIN.iter().map(|(code, name)| Language {
            code: code.to_string(),
            name: name.to_string(),
        }))
    }

    pub fn from_languages(languages: impl IntoIterator<Item = Language>) -> Self {
        Self {
            languages: languages.into_iter().map(|l| (l.code.clone(), l)).collect(),
        }
    }

    /// Reads `path` when it exists, otherwise falls back to the built-in list.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::builtin());
        }
        let data = fs::read_to_string(path)?;
        let languages: Vec<Language> = serde_json::from_str(&data)?;
        tracing::info!(count = languages.len(), path = %path.display(), "loaded language catalog");
        Ok(Self::from_languages(languages))
    }

    pub fn contains(&self, code: &str) -> bool {
        self.languages.contains_key(code)
    }

    pub fn get(&self, code: &str) -> Option<&Language> {
        self.languages.get(code)
    }

    pub fn all(&self) -> Vec<Language> {
        self.languages.values().cloned().collect()
    }
}
