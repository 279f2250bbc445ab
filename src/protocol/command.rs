#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Ping,
    LanguageList,
    DatasetCreate,
    DatasetValidate,
    DatasetGet,
    DatasetList,
    DatasetUpdate,
    DatasetFormLayout,
    DatasetDelete,
    DatasetCombine,
    PhraseSearch,
    FavoriteAdd,
    FavoriteList,
    FavoriteSearch,
    FilterCreate,
    FilterList,
    FilterTaskCreate,
    FilterTaskList,
    FilterTaskRun,
    Unknown(String),
}

impl From<&str> for Command {
    fn from(s: &str) -> Self {
        match s {
            "ping" => Command::Ping,
            "language.list" => Command::LanguageList,
            "dataset.create" => Command::DatasetCreate,
            "dataset.validate" => Command::DatasetValidate,
            "dataset.get" => Command::DatasetGet,
            "dataset.list" => Command::DatasetList,
            "dataset.update" => Command::DatasetUpdate,
            "dataset.form_layout" => Command::DatasetFormLayout,
            "dataset.delete" => Command::DatasetDelete,
            "dataset.combine" => Command::DatasetCombine,
            "phrase.search" => Command::PhraseSearch,
            "favorite.add" => Command::FavoriteAdd,
            "favorite.list" => Command::FavoriteList,
            "favorite.search" => Command::FavoriteSearch,
            "filter.create" => Command::FilterCreate,
            "filter.list" => Command::FilterList,
            "filter_task.create" => Command::FilterTaskCreate,
            "filter_task.list" => Command::FilterTaskList,
            "filter_task.run" => Command::FilterTaskRun,
            other => Command::Unknown(other.to_string()),
        }
    }
}
