use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::error::Result;
use crate::model::dataset::Dataset;
use crate::services::encoding;
use crate::services::store::{PendingFile, Store};

/// One aligned line of a dataset.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SentencePair {
    /// 1-based line in the source file.
    pub line: usize,
    pub source: String,
    pub target: Option<String>,
}

/// The `n`th non-blank source line paired with the `n`th non-blank target
/// line, the same lines the sentence counter sees.
pub fn read_pairs(store: &Store, dataset: &Dataset) -> Result<Vec<SentencePair>> {
    let source = encoding::read_lines(&store.file_path(&dataset.source_file))?;
    let mut target = match &dataset.target_file {
        Some(f) => Some(non_blank_lines(encoding::read_lines(&store.file_path(f))?).into_iter()),
        None => None,
    };

    Ok(source
        .into_iter()
        .enumerate()
        .filter(|(_, s)| !is_blank(s))
        .map(|(i, s)| SentencePair {
            line: i + 1,
            source: s,
            target: target.as_mut().map(|t| t.next().unwrap_or_default()),
        })
        .collect())
}

pub fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

pub fn non_blank_lines(lines: Vec<String>) -> Vec<String> {
    lines.into_iter().filter(|l| !is_blank(l)).collect()
}

/// Writes `lines` as UTF-8, one per line, and returns it as a staged file.
pub fn write_lines<'a>(
    dir: &Path,
    name: &str,
    lines: impl IntoIterator<Item = &'a str>,
) -> Result<PendingFile> {
    let mut body = String::new();
    for line in lines {
        body.push_str(line);
        body.push('\n');
    }

    let path = dir.join(name);
    fs::write(&path, body)?;

    Ok(PendingFile {
        name: name.to_string(),
        path,
        staged: true,
    })
}
