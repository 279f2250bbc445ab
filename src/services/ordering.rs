use std::cmp::Ordering;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::error::{Result, ValidationErrors};
use crate::model::dataset::Dataset;
use crate::model::filter::FilterTask;

pub const DATASET_COLUMNS: &[&str] = &[
    "id",
    "title",
    "source_language",
    "target_language",
    "sentence_count",
];

pub const FILTER_TASK_COLUMNS: &[&str] =
    &["id", "title", "filter", "dataset", "save_filter", "status"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderToken {
    pub column: String,
    pub descending: bool,
}

fn token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(-?)([a-z_]+)$").expect("static regex"))
}

/// Parses `"-sentence_count,title"` against `columns`. Blank input yields no
/// tokens. Errors land on the `order` field.
pub fn parse_order(raw: &str, columns: &[&str]) -> Result<Vec<OrderToken>> {
    let mut errors = ValidationErrors::new();
    let mut tokens = Vec::new();

    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let Some(caps) = token_re().captures(part) else {
            errors.add_field("order", format!("{part:?} is not a valid order token"));
            continue;
        };
        let column = &caps[2];
        if !columns.contains(&column) {
            errors.add_field("order", format!("cannot order by {column:?}"));
            continue;
        }
        if tokens.iter().any(|t: &OrderToken| t.column == column) {
            errors.add_field("order", format!("{column:?} appears more than once"));
            continue;
        }
        tokens.push(OrderToken {
            column: column.to_string(),
            descending: &caps[1] == "-",
        });
    }

    errors.into_result()?;
    Ok(tokens)
}

pub trait Orderable {
    fn compare_by(&self, other: &Self, column: &str) -> Ordering;
}

impl Orderable for Dataset {
    fn compare_by(&self, other: &Self, column: &str) -> Ordering {
        match column {
            "title" => self.title.to_lowercase().cmp(&other.title.to_lowercase()),
            "source_language" => self.source_language.cmp(&other.source_language),
            "target_language" => self.target_language.cmp(&other.target_language),
            "sentence_count" => self.sentence_count.cmp(&other.sentence_count),
            _ => self.id.cmp(&other.id),
        }
    }
}

impl Orderable for FilterTask {
    fn compare_by(&self, other: &Self, column: &str) -> Ordering {
        match column {
            "title" => self.title.to_lowercase().cmp(&other.title.to_lowercase()),
            "filter" => self.filter_id.cmp(&other.filter_id),
            "dataset" => self.dataset_id.cmp(&other.dataset_id),
            "save_filter" => self.save_filter.cmp(&other.save_filter),
            "status" => self.status.cmp(&other.status),
            _ => self.id.cmp(&other.id),
        }
    }
}

/// Stable sort by the tokens in order, `id` breaking remaining ties.
pub fn apply<T: Orderable>(rows: &mut [T], tokens: &[OrderToken]) {
    rows.sort_by(|a, b| {
        tokens
            .iter()
            .map(|t| {
                let ord = a.compare_by(b, &t.column);
                if t.descending {
                    ord.reverse()
                } else {
                    ord
                }
            })
            .find(|o| *o != Ordering::Equal)
            .unwrap_or_else(|| a.compare_by(b, "id"))
    });
}
