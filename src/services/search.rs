use std::str::FromStr;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::app::App;
use crate::error::{CoreError, Result, ValidationErrors};
use crate::services::corpus::{self, SentencePair};
use crate::services::intake::non_blank;
use crate::services::normalize::normalize;

pub const DEFAULT_LIMIT: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    Exact,
    #[default]
    Partial,
    StartsWith,
    EndsWith,
    /// The phrase appears as whole words.
    Word,
}

impl FromStr for MatchMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "exact" => Ok(MatchMode::Exact),
            "partial" => Ok(MatchMode::Partial),
            "starts_with" => Ok(MatchMode::StartsWith),
            "ends_with" => Ok(MatchMode::EndsWith),
            "word" => Ok(MatchMode::Word),
            other => Err(format!("unknown match mode {other:?}")),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct PhraseSearchForm {
    #[serde(default, alias = "dataset")]
    pub dataset_id: Option<u64>,

    #[serde(default)]
    pub phrase_from: Option<String>,

    #[serde(default)]
    pub phrase_to: Option<String>,

    #[serde(default)]
    pub match_mode: MatchMode,

    #[serde(default)]
    pub limit: Option<usize>,
}

/// A normalized phrase compiled for one match mode.
pub struct Matcher {
    needle: String,
    mode: MatchMode,
    word: Option<Regex>,
}

impl Matcher {
    pub fn new(phrase: &str, mode: MatchMode) -> Self {
        let needle = normalize(phrase);
        let word = (mode == MatchMode::Word)
            .then(|| Regex::new(&format!(r"(?:^|\W){}(?:\W|$)", regex::escape(&needle))).ok())
            .flatten();
        Self { needle, mode, word }
    }

    pub fn is_match(&self, text: &str) -> bool {
        let hay = normalize(text);
        match self.mode {
            MatchMode::Exact => hay == self.needle,
            MatchMode::Partial => hay.contains(&self.needle),
            MatchMode::StartsWith => hay.starts_with(&self.needle),
            MatchMode::EndsWith => hay.ends_with(&self.needle),
            MatchMode::Word => self.word.as_ref().is_some_and(|re| re.is_match(&hay)),
        }
    }
}

/// Needs a dataset and at least one phrase. Returns the dataset id.
pub fn validate(form: &PhraseSearchForm) -> Result<u64> {
    let mut errors = ValidationErrors::new();
    if form.dataset_id.is_none() {
        errors.add_field("dataset_id", "this field is required");
    }
    if non_blank(&form.phrase_from).is_none() && non_blank(&form.phrase_to).is_none() {
        errors.add_non_field("enter a phrase in at least one of the two languages");
    }

    match form.dataset_id {
        Some(id) if errors.is_empty() => Ok(id),
        _ => Err(CoreError::Validation(errors)),
    }
}

pub fn search(app: &App, form: &PhraseSearchForm) -> Result<Vec<SentencePair>> {
    let dataset_id = validate(form)?;

    let dataset = app.store.get_dataset(dataset_id)?;
    let from = non_blank(&form.phrase_from).map(|p| Matcher::new(&p, form.match_mode));
    let to = non_blank(&form.phrase_to).map(|p| Matcher::new(&p, form.match_mode));
    let limit = form.limit.unwrap_or(DEFAULT_LIMIT);

    let hits: Vec<SentencePair> = corpus::read_pairs(&app.store, &dataset)?
        .into_iter()
        .filter(|pair| from.as_ref().map_or(true, |m| m.is_match(&pair.source)))
        .filter(|pair| {
            to.as_ref().map_or(true, |m| {
                pair.target.as_deref().is_some_and(|t| m.is_match(t))
            })
        })
        .take(limit)
        .collect();

    tracing::debug!(dataset = dataset.id, hits = hits.len(), "phrase search");
    Ok(hits)
}
