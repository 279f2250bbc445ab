use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Filter {
    pub id: u64,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub min_words: Option<usize>,

    #[serde(default)]
    pub max_words: Option<usize>,

    /// Regular expression the source sentence has to match.
    #[serde(default)]
    pub pattern: Option<String>,

    #[serde(default)]
    pub skip_duplicates: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    Done,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct FilterTask {
    pub id: u64,

    #[serde(default)]
    pub title: String,

    pub filter_id: u64,

    pub dataset_id: u64,

    /// Keep the filter around once the task has run.
    #[serde(default)]
    pub save_filter: bool,

    #[serde(default)]
    pub status: TaskStatus,

    #[serde(default)]
    pub result_dataset_id: Option<u64>,
}
