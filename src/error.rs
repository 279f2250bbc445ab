use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::services::fetch::FetchError;

pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors collected while validating a form.
///
/// `fields` holds messages attached to one input, `non_field` the ones that
/// concern the submission as a whole.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrors {
    #[serde(default)]
    pub fields: BTreeMap<String, Vec<String>>,

    #[serde(default)]
    pub non_field: Vec<String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_field(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    pub fn add_non_field(&mut self, message: impl Into<String>) {
        self.non_field.push(message.into());
    }

    pub fn extend_non_field(&mut self, messages: impl IntoIterator<Item = String>) {
        self.non_field.extend(messages);
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.non_field.is_empty()
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn field(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// `Ok(())` when nothing was recorded.
    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(CoreError::Validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = self.non_field.clone();
        for (field, messages) in &self.fields {
            for m in messages {
                parts.push(format!("{field}: {m}"));
            }
        }
        write!(f, "{}", parts.join("; "))
    }
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: u64 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("download failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("unknown command")]
    UnknownCommand(String),
}

impl CoreError {
    pub fn not_found(kind: &'static str, id: u64) -> Self {
        CoreError::NotFound { kind, id }
    }

    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            CoreError::Validation(v) => Some(v),
            _ => None,
        }
    }
}

impl From<ValidationErrors> for CoreError {
    fn from(v: ValidationErrors) -> Self {
        CoreError::Validation(v)
    }
}
