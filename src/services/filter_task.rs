use std::collections::HashSet;

use regex::Regex;
use serde::Deserialize;

use crate::app::App;
use crate::error::{CoreError, Result, ValidationErrors};
use crate::model::dataset::Dataset;
use crate::model::filter::{Filter, FilterTask, TaskStatus};
use crate::services::corpus::{self, SentencePair};
use crate::services::intake::{clean_title, non_blank};
use crate::services::normalize::{normalize, word_count};
use crate::services::ordering::{self, FILTER_TASK_COLUMNS};
use crate::services::staging::StagingDir;
use crate::services::store::{DatasetDraft, FILTERS, FILTER_TASKS};

#[derive(Debug, Clone, Deserialize, Default)]
pub struct FilterForm {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub min_words: Option<usize>,

    #[serde(default)]
    pub max_words: Option<usize>,

    #[serde(default)]
    pub pattern: Option<String>,

    #[serde(default)]
    pub skip_duplicates: bool,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct FilterTaskForm {
    #[serde(default)]
    pub title: String,

    #[serde(default, alias = "filter")]
    pub filter_id: Option<u64>,

    #[serde(default, alias = "dataset")]
    pub dataset_id: Option<u64>,

    #[serde(default)]
    pub save_filter: bool,
}

pub fn create_filter(app: &App, form: &FilterForm) -> Result<Filter> {
    let mut errors = ValidationErrors::new();
    let title = clean_title(&form.title, &mut errors);

    if let (Some(min), Some(max)) = (form.min_words, form.max_words) {
        if min > max {
            errors.add_field("max_words", "must not be smaller than min_words");
        }
    }

    let pattern = non_blank(&form.pattern);
    if let Some(p) = &pattern {
        if let Err(e) = Regex::new(p) {
            errors.add_field("pattern", format!("invalid regular expression: {e}"));
        }
    }

    errors.into_result()?;

    let filter = app.store.insert(FILTERS, |id| Filter {
        id,
        title,
        min_words: form.min_words,
        max_words: form.max_words,
        pattern,
        skip_duplicates: form.skip_duplicates,
    })?;
    tracing::info!(id = filter.id, "filter created");
    Ok(filter)
}

pub fn list_filters(app: &App) -> Result<Vec<Filter>> {
    app.store.load_table(FILTERS)
}

pub fn create_task(app: &App, form: &FilterTaskForm) -> Result<FilterTask> {
    let mut errors = ValidationErrors::new();
    let title = clean_title(&form.title, &mut errors);

    let filter_id = match form.filter_id {
        None => {
            errors.add_field("filter_id", "this field is required");
            None
        }
        Some(id) if app.store.find::<Filter>(FILTERS, id)?.is_none() => {
            errors.add_field("filter_id", "select a valid choice");
            None
        }
        Some(id) => Some(id),
    };

    let dataset_id = match form.dataset_id {
        None => {
            errors.add_field("dataset_id", "this field is required");
            None
        }
        Some(id) if !app.store.dataset_exists(id) => {
            errors.add_field("dataset_id", "select a valid choice");
            None
        }
        Some(id) => Some(id),
    };

    let (filter_id, dataset_id) = match (filter_id, dataset_id) {
        (Some(f), Some(d)) if errors.is_empty() => (f, d),
        _ => return Err(CoreError::Validation(errors)),
    };

    let task = app.store.insert(FILTER_TASKS, |id| FilterTask {
        id,
        title,
        filter_id,
        dataset_id,
        save_filter: form.save_filter,
        status: TaskStatus::Pending,
        result_dataset_id: None,
    })?;
    tracing::info!(id = task.id, filter_id, dataset_id, "filter task created");
    Ok(task)
}

pub fn list_tasks(app: &App, order: &str) -> Result<Vec<FilterTask>> {
    let tokens = ordering::parse_order(order, FILTER_TASK_COLUMNS)?;
    let mut tasks: Vec<FilterTask> = app.store.load_table(FILTER_TASKS)?;
    ordering::apply(&mut tasks, &tokens);
    Ok(tasks)
}

/// Compiled form of a [`Filter`].
pub struct SentenceFilter {
    min_words: Option<usize>,
    max_words: Option<usize>,
    pattern: Option<Regex>,
    skip_duplicates: bool,
}

impl SentenceFilter {
    pub fn compile(filter: &Filter) -> Result<Self> {
        let pattern = match &filter.pattern {
            Some(p) => Some(Regex::new(p).map_err(|e| {
                let mut errors = ValidationErrors::new();
                errors.add_field("pattern", format!("invalid regular expression: {e}"));
                CoreError::Validation(errors)
            })?),
            None => None,
        };
        Ok(Self {
            min_words: filter.min_words,
            max_words: filter.max_words,
            pattern,
            skip_duplicates: filter.skip_duplicates,
        })
    }

    fn accepts(&self, source: &str) -> bool {
        let words = word_count(source);
        self.min_words.map_or(true, |min| words >= min)
            && self.max_words.map_or(true, |max| words <= max)
            && self.pattern.as_ref().map_or(true, |re| re.is_match(source))
    }

    pub fn apply(&self, pairs: Vec<SentencePair>) -> Vec<SentencePair> {
        let mut seen: HashSet<String> = HashSet::new();
        pairs
            .into_iter()
            .filter(|p| self.accepts(&p.source))
            .filter(|p| !self.skip_duplicates || seen.insert(normalize(&p.source)))
            .collect()
    }
}

/// Runs a pending task: writes the kept pairs as a new dataset and drops the
/// filter when it was not meant to be kept.
pub fn run_task(app: &App, task_id: u64) -> Result<FilterTask> {
    let mut task: FilterTask = app
        .store
        .find(FILTER_TASKS, task_id)?
        .ok_or_else(|| CoreError::not_found("filter task", task_id))?;

    if task.status == TaskStatus::Done {
        let mut errors = ValidationErrors::new();
        errors.add_non_field("this task has already run");
        return Err(CoreError::Validation(errors));
    }

    let filter: Filter = app
        .store
        .find(FILTERS, task.filter_id)?
        .ok_or_else(|| CoreError::not_found("filter", task.filter_id))?;
    let dataset = app.store.get_dataset(task.dataset_id)?;

    let pairs = corpus::read_pairs(&app.store, &dataset)?;
    let kept = SentenceFilter::compile(&filter)?.apply(pairs);
    if kept.is_empty() {
        let mut errors = ValidationErrors::new();
        errors.add_non_field("the filter removed every sentence");
        return Err(CoreError::Validation(errors));
    }

    let staging = StagingDir::create(&app.config.staging_dir)?;
    let created = write_result(app, &task, &dataset, &kept, &staging);
    staging.discard();
    let result = created?;

    task.status = TaskStatus::Done;
    task.result_dataset_id = Some(result.id);
    app.store.update(FILTER_TASKS, &task)?;

    tracing::info!(
        task = task.id,
        kept = kept.len(),
        total = dataset.sentence_count,
        result = result.id,
        "filter task finished"
    );

    if !task.save_filter {
        discard_unused_filter(app, filter.id)?;
    }

    Ok(task)
}

/// Drops the pending tasks that run against `dataset_id`, along with their
/// unsaved filters. Returns how many tasks went away.
pub fn discard_pending_for_dataset(app: &App, dataset_id: u64) -> Result<usize> {
    let tasks: Vec<FilterTask> = app.store.load_table(FILTER_TASKS)?;
    let (dropped, kept): (Vec<FilterTask>, Vec<FilterTask>) = tasks
        .into_iter()
        .partition(|t| t.dataset_id == dataset_id && t.status == TaskStatus::Pending);

    if dropped.is_empty() {
        return Ok(0);
    }
    app.store.save_table(FILTER_TASKS, &kept)?;

    for task in dropped.iter().filter(|t| !t.save_filter) {
        discard_unused_filter(app, task.filter_id)?;
    }
    Ok(dropped.len())
}

fn discard_unused_filter(app: &App, filter_id: u64) -> Result<()> {
    let tasks: Vec<FilterTask> = app.store.load_table(FILTER_TASKS)?;
    let still_used = tasks
        .iter()
        .any(|t| t.filter_id == filter_id && t.status == TaskStatus::Pending);
    if !still_used && app.store.remove::<Filter>(FILTERS, filter_id)? {
        tracing::debug!(filter = filter_id, "discarded unsaved filter");
    }
    Ok(())
}

fn write_result(
    app: &App,
    task: &FilterTask,
    dataset: &Dataset,
    kept: &[SentencePair],
    staging: &StagingDir,
) -> Result<Dataset> {
    let source = corpus::write_lines(
        staging.path(),
        &dataset.source_file.name,
        kept.iter().map(|p| p.source.as_str()),
    )?;

    let target = match &dataset.target_file {
        Some(f) => Some(corpus::write_lines(
            staging.path(),
            &format!("{}.target", f.name),
            kept.iter().map(|p| p.target.as_deref().unwrap_or_default()),
        )?),
        None => None,
    };

    let sentence_count = app.counter.count(&source.path)?;

    app.store.create_dataset(DatasetDraft {
        title: task.title.clone(),
        source_language: dataset.source_language.clone(),
        target_language: dataset.target_language.clone(),
        source,
        target,
        sentence_count,
    })
}
