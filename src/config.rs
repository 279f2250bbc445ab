use std::path::PathBuf;
use std::time::Duration;

use crate::error::{CoreError, Result};
use crate::services::sentences::SentenceMode;

const DEFAULT_CHUNK_SIZE: usize = 8192;
const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub staging_dir: PathBuf,
    pub download_chunk_size: usize,
    /// `None` disables the request timeout.
    pub http_timeout: Option<Duration>,
    pub sentence_mode: SentenceMode,
}

impl AppConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        let staging_dir = data_dir.join("staging");
        Self {
            data_dir,
            staging_dir,
            download_chunk_size: DEFAULT_CHUNK_SIZE,
            http_timeout: Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            sentence_mode: SentenceMode::Lines,
        }
    }

    pub fn from_env() -> Result<Self> {
        let data_dir = std::env::var("CORPUS_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_data_dir());

        let mut cfg = Self::new(data_dir);

        if let Ok(staging) = std::env::var("CORPUS_STAGING_DIR") {
            cfg.staging_dir = PathBuf::from(staging);
        }

        if let Ok(raw) = std::env::var("CORPUS_DOWNLOAD_CHUNK") {
            let size: usize = raw.trim().parse().map_err(|_| {
                CoreError::Config(format!("CORPUS_DOWNLOAD_CHUNK is not a number: {raw}"))
            })?;
            if size == 0 {
                return Err(CoreError::Config("CORPUS_DOWNLOAD_CHUNK must be positive".into()));
            }
            cfg.download_chunk_size = size;
        }

        if let Ok(raw) = std::env::var("CORPUS_HTTP_TIMEOUT_SECS") {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                CoreError::Config(format!("CORPUS_HTTP_TIMEOUT_SECS is not a number: {raw}"))
            })?;
            cfg.http_timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }

        if let Ok(raw) = std::env::var("CORPUS_SENTENCE_MODE") {
            cfg.sentence_mode = raw.parse().map_err(CoreError::Config)?;
        }

        Ok(cfg)
    }

    pub fn languages_file(&self) -> PathBuf {
        self.data_dir.join("languages.json")
    }
}

fn default_data_dir() -> PathBuf {
    if let Ok(local) = std::env::var("LOCALAPPDATA") {
        return PathBuf::from(local).join("CorpusCore").join("Data");
    }
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("data")
}
