//! Dataset creation: resolve both file slots, count sentences, validate the
//! language pair and the file pairing, then persist.

use std::path::PathBuf;

use serde::Deserialize;

use crate::app::App;
use crate::error::{CoreError, Result, ValidationErrors};
use crate::model::dataset::Dataset;
use crate::services::filename::validate_filename;
use crate::services::pairing::PairingInput;
use crate::services::staging::StagingDir;
use crate::services::store::{DatasetDraft, PendingFile};

pub const MAX_TITLE_LEN: usize = 200;

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct UploadedFile {
    pub name: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct DatasetForm {
    #[serde(default)]
    pub title: String,

    #[serde(default, alias = "source_lang")]
    pub source_language: String,

    #[serde(default, alias = "target_lang")]
    pub target_language: Option<String>,

    #[serde(default)]
    pub source_file: Option<UploadedFile>,

    #[serde(default)]
    pub source_url: Option<String>,

    #[serde(default)]
    pub target_file: Option<UploadedFile>,

    #[serde(default)]
    pub target_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Source,
    Target,
}

impl Slot {
    fn file_field(self) -> &'static str {
        match self {
            Slot::Source => "source_file",
            Slot::Target => "target_file",
        }
    }

    fn staging_name(self) -> &'static str {
        match self {
            Slot::Source => "source",
            Slot::Target => "target",
        }
    }

    fn url_field(self) -> &'static str {
        match self {
            Slot::Source => "source_url",
            Slot::Target => "target_url",
        }
    }
}

pub(crate) fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

pub(crate) fn clean_title(title: &str, errors: &mut ValidationErrors) -> String {
    let title = title.trim();
    if title.is_empty() {
        errors.add_field("title", "this field is required");
    } else if title.chars().count() > MAX_TITLE_LEN {
        errors.add_field("title", format!("title must be at most {MAX_TITLE_LEN} characters"));
    }
    title.to_string()
}

/// Validates the form. Downloads land in `staging`; the caller discards it
/// when validation fails.
fn clean(
    app: &App,
    form: &DatasetForm,
    staging: &StagingDir,
) -> std::result::Result<DatasetDraft, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let title = clean_title(&form.title, &mut errors);
    let source_language = form.source_language.trim().to_string();
    let target_language = non_blank(&form.target_language);

    let source_url = non_blank(&form.source_url);
    let target_url = non_blank(&form.target_url);

    let source = resolve_slot(
        app,
        Slot::Source,
        form.source_file.as_ref(),
        source_url.as_deref(),
        staging,
        &mut errors,
    );
    if source.is_none() && form.source_file.is_none() && source_url.is_none() {
        errors.add_field(Slot::Source.file_field(), "this field is required");
    }

    let target_supplied = form.target_file.is_some() || target_url.is_some();
    let target = resolve_slot(
        app,
        Slot::Target,
        form.target_file.as_ref(),
        target_url.as_deref(),
        staging,
        &mut errors,
    );

    let source_sentences = source
        .as_ref()
        .and_then(|s| count(app, Slot::Source, s, source_url.is_some(), &mut errors));
    let target_sentences = target
        .as_ref()
        .and_then(|t| count(app, Slot::Target, t, target_url.is_some(), &mut errors));

    errors.extend_non_field(
        app.languages
            .validate(&source_language, target_language.as_deref()),
    );

    if let Some(source_sentences) = source_sentences {
        errors.extend_non_field(app.pairing.validate(&PairingInput {
            target_language: target_language.as_deref(),
            has_target_file: target_supplied,
            source_sentences,
            target_sentences,
        }));
    }

    if !errors.is_empty() {
        tracing::debug!(%errors, "dataset form rejected");
        return Err(errors);
    }

    match (source, source_sentences) {
        (Some(source), Some(sentence_count)) => Ok(DatasetDraft {
            title,
            source_language,
            target_language,
            source,
            target,
            sentence_count,
        }),
        _ => {
            // unreachable in practice: a missing source always records an error
            errors.add_field(Slot::Source.file_field(), "this field is required");
            Err(errors)
        }
    }
}

fn resolve_slot(
    app: &App,
    slot: Slot,
    upload: Option<&UploadedFile>,
    url: Option<&str>,
    staging: &StagingDir,
    errors: &mut ValidationErrors,
) -> Option<PendingFile> {
    if let Some(url) = url {
        let dest = staging.path().join(slot.staging_name());
        let path = match app.fetcher.fetch(url, &dest) {
            Ok(p) => p,
            Err(e) => {
                errors.add_field(slot.url_field(), format!("could not download the file: {e}"));
                return None;
            }
        };

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();

        if let Err(msg) = validate_filename(&name) {
            errors.add_field(slot.url_field(), msg);
            return None;
        }

        return Some(PendingFile {
            name,
            path,
            staged: true,
        });
    }

    let upload = upload?;

    if let Err(msg) = validate_filename(&upload.name) {
        errors.add_field(slot.file_field(), msg);
        return None;
    }

    if !upload.path.is_file() {
        errors.add_field(slot.file_field(), "the uploaded file is missing");
        return None;
    }

    Some(PendingFile {
        name: upload.name.clone(),
        path: upload.path.clone(),
        staged: false,
    })
}

fn count(
    app: &App,
    slot: Slot,
    file: &PendingFile,
    from_url: bool,
    errors: &mut ValidationErrors,
) -> Option<usize> {
    match app.counter.count(&file.path) {
        Ok(n) => Some(n),
        Err(e) => {
            let field = if from_url { slot.url_field() } else { slot.file_field() };
            errors.add_field(field, format!("could not read the file: {e}"));
            None
        }
    }
}

/// Validates without persisting; staged downloads are discarded either way.
pub fn validate(app: &App, form: &DatasetForm) -> Result<()> {
    let staging = StagingDir::create(&app.config.staging_dir)?;
    let outcome = clean(app, form, &staging);
    staging.discard();
    outcome.map(|_| ()).map_err(CoreError::Validation)
}

pub fn create(app: &App, form: &DatasetForm) -> Result<Dataset> {
    let staging = StagingDir::create(&app.config.staging_dir)?;

    let draft = match clean(app, form, &staging) {
        Ok(d) => d,
        Err(errors) => {
            staging.discard();
            return Err(CoreError::Validation(errors));
        }
    };

    let saved = app.store.create_dataset(draft);
    staging.discard();
    saved
}
