//! Merging several datasets with the same language pair into a new one.

use serde::Deserialize;

use crate::app::App;
use crate::error::{CoreError, Result, ValidationErrors};
use crate::model::dataset::Dataset;
use crate::services::corpus;
use crate::services::encoding;
use crate::services::intake::clean_title;
use crate::services::staging::StagingDir;
use crate::services::store::DatasetDraft;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct CombineForm {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub dataset_ids: Vec<u64>,
}

fn clean(app: &App, form: &CombineForm) -> Result<(String, Vec<Dataset>)> {
    let mut errors = ValidationErrors::new();
    let title = clean_title(&form.title, &mut errors);

    let mut ids: Vec<u64> = Vec::with_capacity(form.dataset_ids.len());
    for id in &form.dataset_ids {
        if ids.contains(id) {
            errors.add_field("dataset_ids", format!("dataset {id} is listed twice"));
        } else {
            ids.push(*id);
        }
    }
    if ids.len() < 2 {
        errors.add_field("dataset_ids", "select at least two datasets");
    }

    let mut datasets = Vec::with_capacity(ids.len());
    for id in ids {
        match app.store.get_dataset(id) {
            Ok(d) => datasets.push(d),
            Err(CoreError::NotFound { .. }) => {
                errors.add_field("dataset_ids", format!("dataset {id} does not exist"))
            }
            Err(e) => return Err(e),
        }
    }

    if let Some(first) = datasets.first() {
        let pair = first.language_pair();
        if datasets.iter().any(|d| d.language_pair() != pair) {
            errors.add_non_field("all datasets must share the same language pair");
        }
    }

    errors.into_result()?;
    Ok((title, datasets))
}

pub fn combine(app: &App, form: &CombineForm) -> Result<Dataset> {
    let (title, datasets) = clean(app, form)?;
    let first = &datasets[0];

    let staging = StagingDir::create(&app.config.staging_dir)?;
    let result = build(app, title, &datasets, first, &staging);
    staging.discard();

    let combined = result?;
    tracing::info!(
        id = combined.id,
        parts = datasets.len(),
        sentences = combined.sentence_count,
        "datasets combined"
    );
    Ok(combined)
}

fn build(
    app: &App,
    title: String,
    datasets: &[Dataset],
    first: &Dataset,
    staging: &StagingDir,
) -> Result<Dataset> {
    let mut source_lines: Vec<String> = Vec::new();
    let mut target_lines: Vec<String> = Vec::new();

    // blank lines are dropped so both sides stay line aligned
    for d in datasets {
        let source = encoding::read_lines(&app.store.file_path(&d.source_file))?;
        source_lines.extend(corpus::non_blank_lines(source));
        if let Some(t) = &d.target_file {
            let target = encoding::read_lines(&app.store.file_path(t))?;
            target_lines.extend(corpus::non_blank_lines(target));
        }
    }

    let source = corpus::write_lines(
        staging.path(),
        &format!("combined.{}", first.source_language),
        source_lines.iter().map(String::as_str),
    )?;

    let target = match &first.target_language {
        Some(lang) => Some(corpus::write_lines(
            staging.path(),
            &format!("combined.{lang}"),
            target_lines.iter().map(String::as_str),
        )?),
        None => None,
    };

    let sentence_count = app.counter.count(&source.path)?;

    app.store.create_dataset(DatasetDraft {
        title,
        source_language: first.source_language.clone(),
        target_language: first.target_language.clone(),
        source,
        target,
        sentence_count,
    })
}
