use std::path::Path;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::services::corpus::is_blank;
use crate::services::encoding;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SentenceMode {
    /// One sentence per non-blank line.
    #[default]
    Lines,
    /// Sentences end at terminal punctuation or line ends.
    Punctuation,
}

impl FromStr for SentenceMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lines" => Ok(SentenceMode::Lines),
            "punctuation" => Ok(SentenceMode::Punctuation),
            other => Err(format!("unknown sentence mode {other:?}")),
        }
    }
}

pub trait SentenceCounter {
    fn count(&self, path: &Path) -> Result<usize>;
}

pub struct LineSentenceCounter;

impl SentenceCounter for LineSentenceCounter {
    fn count(&self, path: &Path) -> Result<usize> {
        let decoded = encoding::read_text(path)?;
        Ok(count_lines(&decoded.text))
    }
}

pub struct PunctuationSentenceCounter;

impl SentenceCounter for PunctuationSentenceCounter {
    fn count(&self, path: &Path) -> Result<usize> {
        let decoded = encoding::read_text(path)?;
        Ok(count_punctuated(&decoded.text))
    }
}

pub fn counter_for(mode: SentenceMode) -> Box<dyn SentenceCounter> {
    match mode {
        SentenceMode::Lines => Box::new(LineSentenceCounter),
        SentenceMode::Punctuation => Box::new(PunctuationSentenceCounter),
    }
}

pub fn count_lines(text: &str) -> usize {
    text.lines().filter(|l| !is_blank(l)).count()
}

fn terminator_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[.!?。！？]+").expect("static regex"))
}

pub fn count_punctuated(text: &str) -> usize {
    text.lines()
        .flat_map(|line| terminator_re().split(line))
        .filter(|s| s.chars().any(char::is_alphanumeric))
        .count()
}
