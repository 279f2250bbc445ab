use serde::{Deserialize, Serialize};

use crate::app::App;
use crate::error::{Result, ValidationErrors};
use crate::model::dataset::Dataset;
use crate::services::filter_task;
use crate::services::intake::{clean_title, non_blank};
use crate::services::pairing::PairingInput;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct DatasetUpdateForm {
    #[serde(default)]
    pub title: String,

    #[serde(default, alias = "source_lang")]
    pub source_language: String,

    #[serde(default, alias = "target_lang")]
    pub target_language: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldState {
    pub name: &'static str,
    pub value: Option<String>,
    pub disabled: bool,
}

/// Editable fields of `dataset` with their initial values. A dataset without
/// a target side cannot gain a target language here.
pub fn form_layout(dataset: &Dataset) -> Vec<FieldState> {
    vec![
        FieldState {
            name: "title",
            value: Some(dataset.title.clone()),
            disabled: false,
        },
        FieldState {
            name: "source_language",
            value: Some(dataset.source_language.clone()),
            disabled: false,
        },
        FieldState {
            name: "target_language",
            value: dataset.target_language.clone(),
            disabled: dataset.target_language.is_none(),
        },
    ]
}

pub fn update(app: &App, id: u64, form: &DatasetUpdateForm) -> Result<Dataset> {
    let mut dataset = app.store.get_dataset(id)?;
    let mut errors = ValidationErrors::new();

    let title = clean_title(&form.title, &mut errors);
    let source_language = form.source_language.trim().to_string();

    // disabled fields keep their initial value
    let target_language = if dataset.target_language.is_none() {
        None
    } else {
        non_blank(&form.target_language)
    };

    errors.extend_non_field(
        app.languages
            .validate(&source_language, target_language.as_deref()),
    );
    errors.extend_non_field(app.pairing.validate(&PairingInput {
        target_language: target_language.as_deref(),
        has_target_file: dataset.target_file.is_some(),
        source_sentences: dataset.sentence_count,
        target_sentences: None,
    }));

    errors.into_result()?;

    dataset.title = title;
    dataset.source_language = source_language;
    dataset.target_language = target_language;
    app.store.save_dataset(&dataset)?;

    tracing::info!(id, "dataset updated");
    Ok(dataset)
}

/// Deletes the dataset together with the pending filter tasks pointing at it.
pub fn delete(app: &App, id: u64) -> Result<()> {
    app.store.delete_dataset(id)?;
    let dropped = filter_task::discard_pending_for_dataset(app, id)?;
    if dropped > 0 {
        tracing::info!(id, tasks = dropped, "dropped pending tasks of deleted dataset");
    }
    Ok(())
}
