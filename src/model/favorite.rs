use serde::{Deserialize, Serialize};

use super::dataset::Dataset;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct FavoritePhrase {
    pub id: u64,

    #[serde(default)]
    pub phrase_from: String,

    #[serde(default)]
    pub phrase_to: String,

    #[serde(default)]
    pub language_from: String,

    #[serde(default)]
    pub language_to: Option<String>,
}

impl FavoritePhrase {
    pub fn matches_pair_of(&self, dataset: &Dataset) -> bool {
        self.language_from == dataset.source_language
            && self.language_to.as_deref() == dataset.target_language.as_deref()
    }
}
