use serde::Deserialize;

use crate::app::App;
use crate::error::Result;
use crate::model::dataset::Dataset;
use crate::services::intake::non_blank;
use crate::services::ordering::{self, DATASET_COLUMNS};

#[derive(Debug, Clone, Deserialize, Default)]
pub struct DatasetListQuery {
    #[serde(default)]
    pub source_language: Option<String>,

    #[serde(default)]
    pub target_language: Option<String>,

    #[serde(default)]
    pub title_contains: Option<String>,

    #[serde(default)]
    pub order: String,
}

pub fn list(app: &App, query: &DatasetListQuery) -> Result<Vec<Dataset>> {
    let tokens = ordering::parse_order(&query.order, DATASET_COLUMNS)?;

    let source = non_blank(&query.source_language);
    let target = non_blank(&query.target_language);
    let needle = non_blank(&query.title_contains).map(|s| s.to_lowercase());

    let mut rows: Vec<Dataset> = app
        .store
        .list_datasets()?
        .into_iter()
        .filter(|d| source.as_deref().map_or(true, |s| d.source_language == s))
        .filter(|d| target.as_deref().map_or(true, |t| d.target_language.as_deref() == Some(t)))
        .filter(|d| needle.as_deref().map_or(true, |n| d.title.to_lowercase().contains(n)))
        .collect();

    ordering::apply(&mut rows, &tokens);
    Ok(rows)
}
