#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use corpus_core::services::fetch::{FetchError, RemoteFetcher};
use corpus_core::services::intake::{DatasetForm, UploadedFile};
use corpus_core::services::languages::LanguagePairValidator;
use corpus_core::services::sentences::SentenceCounter;
use corpus_core::{App, AppConfig, Result};
use tempfile::TempDir;

pub struct Env {
    pub data: TempDir,
    pub uploads: TempDir,
    pub app: App,
}

pub fn env() -> Env {
    let data = tempfile::tempdir().unwrap();
    let uploads = tempfile::tempdir().unwrap();
    let app = App::new(AppConfig::new(data.path())).unwrap();
    Env { data, uploads, app }
}

impl Env {
    pub fn upload(&self, name: &str, body: &str) -> UploadedFile {
        let path = self.uploads.path().join(name);
        fs::write(&path, body).unwrap();
        UploadedFile {
            name: name.to_string(),
            path,
        }
    }

    pub fn staging_entries(&self) -> usize {
        match fs::read_dir(&self.app.config.staging_dir) {
            Ok(rd) => rd.count(),
            Err(_) => 0,
        }
    }
}

pub fn form(title: &str, from: &str, to: Option<&str>) -> DatasetForm {
    DatasetForm {
        title: title.to_string(),
        source_language: from.to_string(),
        target_language: to.map(str::to_string),
        ..Default::default()
    }
}

/// Serves canned bodies keyed by URL; anything else answers 404.
pub struct FakeFetcher {
    pub routes: Vec<(String, String)>,
}

impl RemoteFetcher for FakeFetcher {
    fn fetch(&self, url: &str, dest_dir: &Path) -> std::result::Result<PathBuf, FetchError> {
        let Some((_, body)) = self.routes.iter().find(|(u, _)| u == url) else {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: 404,
            });
        };
        let name = url.rsplit('/').next().unwrap_or_default();
        fs::create_dir_all(dest_dir)?;
        let path = dest_dir.join(name);
        fs::write(&path, body)?;
        Ok(path)
    }
}

pub struct FixedCounter(pub usize);

impl SentenceCounter for FixedCounter {
    fn count(&self, _path: &Path) -> Result<usize> {
        Ok(self.0)
    }
}

pub struct RejectAll;

impl LanguagePairValidator for RejectAll {
    fn validate(&self, _source: &str, _target: Option<&str>) -> Vec<String> {
        vec!["this language pair is not supported".to_string()]
    }
}
