use serde::Deserialize;

use crate::app::App;
use crate::error::{CoreError, Result, ValidationErrors};
use crate::model::dataset::Dataset;
use crate::model::favorite::FavoritePhrase;
use crate::services::corpus::SentencePair;
use crate::services::intake::non_blank;
use crate::services::search::{self, MatchMode, PhraseSearchForm};
use crate::services::store::FAVORITES;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct FavoriteForm {
    #[serde(default)]
    pub phrase_from: String,

    #[serde(default)]
    pub phrase_to: String,

    #[serde(default, alias = "source_language")]
    pub language_from: String,

    #[serde(default, alias = "target_language")]
    pub language_to: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct FavoriteSearchForm {
    pub favorite_id: u64,

    pub dataset_id: u64,

    #[serde(default)]
    pub match_mode: MatchMode,

    #[serde(default)]
    pub limit: Option<usize>,
}

pub fn add(app: &App, form: &FavoriteForm) -> Result<FavoritePhrase> {
    let mut errors = ValidationErrors::new();

    let phrase_from = form.phrase_from.trim().to_string();
    let phrase_to = form.phrase_to.trim().to_string();
    if phrase_from.is_empty() && phrase_to.is_empty() {
        errors.add_non_field("enter a phrase in at least one of the two languages");
    }

    let language_from = form.language_from.trim().to_string();
    let language_to = non_blank(&form.language_to);
    errors.extend_non_field(app.languages.validate(&language_from, language_to.as_deref()));

    errors.into_result()?;

    let favorite = app.store.insert(FAVORITES, |id| FavoritePhrase {
        id,
        phrase_from,
        phrase_to,
        language_from,
        language_to,
    })?;
    tracing::info!(id = favorite.id, "favorite phrase added");
    Ok(favorite)
}

/// All favorites, or only those sharing `dataset`'s language pair.
pub fn choices(app: &App, dataset: Option<&Dataset>) -> Result<Vec<FavoritePhrase>> {
    let all: Vec<FavoritePhrase> = app.store.load_table(FAVORITES)?;
    Ok(match dataset {
        Some(d) => all.into_iter().filter(|f| f.matches_pair_of(d)).collect(),
        None => all,
    })
}

pub fn search(app: &App, form: &FavoriteSearchForm) -> Result<Vec<SentencePair>> {
    let dataset = app.store.get_dataset(form.dataset_id)?;

    let favorite = choices(app, Some(&dataset))?
        .into_iter()
        .find(|f| f.id == form.favorite_id);

    let Some(favorite) = favorite else {
        let mut errors = ValidationErrors::new();
        errors.add_field("favorite_id", "select a valid choice");
        return Err(CoreError::Validation(errors));
    };

    search::search(
        app,
        &PhraseSearchForm {
            dataset_id: Some(dataset.id),
            phrase_from: Some(favorite.phrase_from),
            phrase_to: Some(favorite.phrase_to),
            match_mode: form.match_mode,
            limit: form.limit,
        },
    )
}
