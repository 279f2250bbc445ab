use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{CoreError, Result};
use crate::model::dataset::{Dataset, StoredFile};
use crate::model::favorite::FavoritePhrase;
use crate::model::filter::{Filter, FilterTask};
use crate::services::digest;

const DATASET_FILE: &str = "dataset.json";
/// Last id handed out per table, so ids are never reused after a delete.
const SEQUENCES: &str = "sequences";
const DATASETS: &str = "datasets";

pub const FILTERS: &str = "filters";
pub const FILTER_TASKS: &str = "filter_tasks";
pub const FAVORITES: &str = "favorites";

/// A file waiting to be attached to a dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFile {
    pub name: String,
    pub path: PathBuf,
    /// Downloaded into staging; removed once attached.
    pub staged: bool,
}

#[derive(Debug, Clone)]
pub struct DatasetDraft {
    pub title: String,
    pub source_language: String,
    pub target_language: Option<String>,
    pub source: PendingFile,
    pub target: Option<PendingFile>,
    pub sentence_count: usize,
}

pub trait Record {
    fn id(&self) -> u64;
}

impl Record for Filter {
    fn id(&self) -> u64 {
        self.id
    }
}

impl Record for FilterTask {
    fn id(&self) -> u64 {
        self.id
    }
}

impl Record for FavoritePhrase {
    fn id(&self) -> u64 {
        self.id
    }
}

/// JSON files under the data directory: one directory per dataset plus one
/// file per table.
#[derive(Debug, Clone)]
pub struct Store {
    root: PathBuf,
}

impl Store {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(root.join("datasets"))?;
        Ok(Self { root })
    }

    fn datasets_dir(&self) -> PathBuf {
        self.root.join("datasets")
    }

    fn dataset_dir(&self, id: u64) -> PathBuf {
        self.datasets_dir().join(id.to_string())
    }

    pub fn file_path(&self, file: &StoredFile) -> PathBuf {
        self.root.join(&file.path)
    }

    // datasets

    pub fn list_datasets(&self) -> Result<Vec<Dataset>> {
        let mut datasets = Vec::new();

        for entry in fs::read_dir(self.datasets_dir())?.flatten() {
            let path = entry.path().join(DATASET_FILE);
            if !path.exists() {
                continue;
            }
            match read_json::<Dataset>(&path) {
                Ok(d) => datasets.push(d),
                Err(e) => tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "skipping unreadable dataset"
                ),
            }
        }

        datasets.sort_by_key(|d| d.id);
        Ok(datasets)
    }

    pub fn get_dataset(&self, id: u64) -> Result<Dataset> {
        let path = self.dataset_dir(id).join(DATASET_FILE);
        if !path.exists() {
            return Err(CoreError::not_found("dataset", id));
        }
        read_json(&path)
    }

    pub fn dataset_exists(&self, id: u64) -> bool {
        self.dataset_dir(id).join(DATASET_FILE).exists()
    }

    fn next_dataset_id(&self) -> Result<u64> {
        let max = fs::read_dir(self.datasets_dir())?
            .flatten()
            .filter_map(|e| e.file_name().to_str().and_then(|s| s.parse::<u64>().ok()))
            .max()
            .unwrap_or(0);
        self.next_id(DATASETS, max)
    }

    /// Bumps the sequence for `key`. `floor` is the highest id already in use,
    /// which covers data written before the sequence existed.
    fn next_id(&self, key: &str, floor: u64) -> Result<u64> {
        let path = self.table_path(SEQUENCES);
        let mut sequences: BTreeMap<String, u64> = if path.exists() {
            read_json(&path)?
        } else {
            BTreeMap::new()
        };

        let id = sequences.get(key).copied().unwrap_or(0).max(floor) + 1;
        sequences.insert(key.to_string(), id);
        write_json(&path, &sequences)?;
        Ok(id)
    }

    /// Attaches the draft's files to a new dataset directory and writes the
    /// record. Staged files are removed once copied.
    pub fn create_dataset(&self, draft: DatasetDraft) -> Result<Dataset> {
        let id = self.next_dataset_id()?;
        let dir = self.dataset_dir(id);
        fs::create_dir_all(&dir)?;

        let attached = self.attach(id, "source", &draft.source).and_then(|source_file| {
            let target_file = draft
                .target
                .as_ref()
                .map(|t| self.attach(id, "target", t))
                .transpose()?;
            Ok((source_file, target_file))
        });

        let (source_file, target_file) = match attached {
            Ok(files) => files,
            Err(e) => {
                let _ = fs::remove_dir_all(&dir);
                return Err(e);
            }
        };

        let dataset = Dataset {
            id,
            title: draft.title,
            source_file,
            source_language: draft.source_language,
            target_file,
            target_language: draft.target_language,
            sentence_count: draft.sentence_count,
        };

        write_json(&dir.join(DATASET_FILE), &dataset)?;

        discard_staged(&draft.source);
        if let Some(t) = &draft.target {
            discard_staged(t);
        }

        tracing::info!(
            id,
            title = %dataset.title,
            sentences = dataset.sentence_count,
            "dataset created"
        );
        Ok(dataset)
    }

    fn attach(&self, id: u64, side: &str, file: &PendingFile) -> Result<StoredFile> {
        let rel = PathBuf::from("datasets")
            .join(id.to_string())
            .join(side)
            .join(&file.name);
        let dest = self.root.join(&rel);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::copy(&file.path, &dest)?;
        let (sha256, size) = digest::file_sha256(&dest)?;

        Ok(StoredFile {
            name: file.name.clone(),
            path: rel.to_string_lossy().replace('\\', "/"),
            size,
            sha256,
        })
    }

    pub fn save_dataset(&self, dataset: &Dataset) -> Result<()> {
        let dir = self.dataset_dir(dataset.id);
        if !dir.join(DATASET_FILE).exists() {
            return Err(CoreError::not_found("dataset", dataset.id));
        }
        write_json(&dir.join(DATASET_FILE), dataset)
    }

    pub fn delete_dataset(&self, id: u64) -> Result<()> {
        let dir = self.dataset_dir(id);
        if !dir.join(DATASET_FILE).exists() {
            return Err(CoreError::not_found("dataset", id));
        }
        fs::remove_dir_all(&dir)?;
        tracing::info!(id, "dataset deleted");
        Ok(())
    }

    // tables

    pub fn load_table<T: DeserializeOwned>(&self, table: &str) -> Result<Vec<T>> {
        let path = self.table_path(table);
        if !path.exists() {
            return Ok(Vec::new());
        }
        read_json(&path)
    }

    pub fn save_table<T: Serialize>(&self, table: &str, rows: &[T]) -> Result<()> {
        write_json(&self.table_path(table), &rows)
    }

    /// Assigns the table's next id, appends and persists.
    pub fn insert<T, F>(&self, table: &str, build: F) -> Result<T>
    where
        T: Record + Serialize + DeserializeOwned + Clone,
        F: FnOnce(u64) -> T,
    {
        let mut rows: Vec<T> = self.load_table(table)?;
        let floor = rows.iter().map(Record::id).max().unwrap_or(0);
        let id = self.next_id(table, floor)?;
        let row = build(id);
        rows.push(row.clone());
        self.save_table(table, &rows)?;
        Ok(row)
    }

    pub fn find<T>(&self, table: &str, id: u64) -> Result<Option<T>>
    where
        T: Record + DeserializeOwned,
    {
        let rows: Vec<T> = self.load_table(table)?;
        Ok(rows.into_iter().find(|r| r.id() == id))
    }

    pub fn update<T>(&self, table: &str, row: &T) -> Result<()>
    where
        T: Record + Serialize + DeserializeOwned + Clone,
    {
        let mut rows: Vec<T> = self.load_table(table)?;
        let slot = rows
            .iter_mut()
            .find(|r| r.id() == row.id())
            .ok_or_else(|| CoreError::not_found("record", row.id()))?;
        *slot = row.clone();
        self.save_table(table, &rows)
    }

    pub fn remove<T>(&self, table: &str, id: u64) -> Result<bool>
    where
        T: Record + Serialize + DeserializeOwned,
    {
        let mut rows: Vec<T> = self.load_table(table)?;
        let before = rows.len();
        rows.retain(|r| r.id() != id);
        let removed = rows.len() != before;
        if removed {
            self.save_table(table, &rows)?;
        }
        Ok(removed)
    }

    fn table_path(&self, table: &str) -> PathBuf {
        self.root.join(format!("{table}.json"))
    }
}

/// Removes a staged download and its per-submission directory.
pub fn discard_staged(file: &PendingFile) {
    if !file.staged {
        return;
    }
    if let Err(e) = fs::remove_file(&file.path) {
        tracing::warn!(path = %file.path.display(), error = %e, "could not remove staged file");
    }
    if let Some(parent) = file.path.parent() {
        // only succeeds once the directory is empty
        let _ = fs::remove_dir(parent);
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let data = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    write_atomic(path, json.as_bytes())
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = tmp_path(path);

    if let Some(parent) = tmp.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)?;

    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut p = path.to_path_buf();
    let file_name = match path.file_name().and_then(|s| s.to_str()) {
        Some(n) => n.to_string(),
        None => "table".to_string(),
    };
    p.set_file_name(format!("{file_name}.tmp"));
    p
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending(dir: &Path, name: &str, body: &str, staged: bool) -> PendingFile {
        let path = dir.join(name);
        fs::write(&path, body).unwrap();
        PendingFile {
            name: name.to_string(),
            path,
            staged,
        }
    }

    #[test]
    fn dataset_ids_increase_and_files_are_copied() {
        let root = tempfile::tempdir().unwrap();
        let uploads = tempfile::tempdir().unwrap();
        let store = Store::open(root.path()).unwrap();

        let draft = DatasetDraft {
            title: "news".into(),
            source_language: "en".into(),
            target_language: None,
            source: pending(uploads.path(), "a.en", "x\ny\n", false),
            target: None,
            sentence_count: 2,
        };

        let first = store.create_dataset(draft.clone()).unwrap();
        let second = store.create_dataset(draft).unwrap();
        assert_eq!((first.id, second.id), (1, 2));

        let stored = store.file_path(&first.source_file);
        assert_eq!(fs::read_to_string(stored).unwrap(), "x\ny\n");
        assert_eq!(first.source_file.size, 4);
        assert_eq!(first.source_file.sha256.len(), 64);
        // uploads stay where they are
        assert!(uploads.path().join("a.en").exists());

        assert_eq!(store.list_datasets().unwrap().len(), 2);
        assert_eq!(store.get_dataset(2).unwrap().title, "news");
    }

    #[test]
    fn staged_files_are_removed_after_attach() {
        let root = tempfile::tempdir().unwrap();
        let store = Store::open(root.path()).unwrap();
        let staging = root.path().join("staging").join("abc");
        fs::create_dir_all(&staging).unwrap();

        let draft = DatasetDraft {
            title: "remote".into(),
            source_language: "en".into(),
            target_language: Some("de".into()),
            source: pending(&staging, "s.txt", "a\n", true),
            target: Some(pending(&staging, "t.txt", "b\n", true)),
            sentence_count: 1,
        };

        let d = store.create_dataset(draft).unwrap();
        assert!(d.target_file.is_some());
        assert!(!staging.exists());
    }

    #[test]
    fn missing_records_are_not_found() {
        let root = tempfile::tempdir().unwrap();
        let store = Store::open(root.path()).unwrap();

        assert!(matches!(
            store.get_dataset(9),
            Err(CoreError::NotFound { kind: "dataset", id: 9 })
        ));
        assert!(store.delete_dataset(9).is_err());
    }

    #[test]
    fn table_rows_get_sequential_ids() {
        let root = tempfile::tempdir().unwrap();
        let store = Store::open(root.path()).unwrap();

        let build = |id| FavoritePhrase {
            id,
            phrase_from: "hello".into(),
            phrase_to: "hallo".into(),
            language_from: "en".into(),
            language_to: Some("de".into()),
        };
        store.insert(FAVORITES, build).unwrap();
        let second = store.insert(FAVORITES, build).unwrap();
        assert_eq!(second.id, 2);

        assert!(store.remove::<FavoritePhrase>(FAVORITES, 1).unwrap());
        assert!(!store.remove::<FavoritePhrase>(FAVORITES, 1).unwrap());
        let third = store.insert(FAVORITES, build).unwrap();
        assert_eq!(third.id, 3);
        assert!(store.find::<FavoritePhrase>(FAVORITES, 2).unwrap().is_some());

        // removing the newest row does not hand its id out again
        assert!(store.remove::<FavoritePhrase>(FAVORITES, 3).unwrap());
        assert_eq!(store.insert(FAVORITES, build).unwrap().id, 4);

        // sequences are per table
        let filter = store
            .insert(FILTERS, |id| Filter {
                id,
                title: "f".into(),
                min_words: None,
                max_words: None,
                pattern: None,
                skip_duplicates: false,
            })
            .unwrap();
        assert_eq!(filter.id, 1);
    }

    #[test]
    fn deleted_dataset_ids_are_not_reused() {
        let root = tempfile::tempdir().unwrap();
        let uploads = tempfile::tempdir().unwrap();
        let store = Store::open(root.path()).unwrap();

        let draft = DatasetDraft {
            title: "news".into(),
            source_language: "en".into(),
            target_language: None,
            source: pending(uploads.path(), "a.en", "x\n", false),
            target: None,
            sentence_count: 1,
        };

        store.create_dataset(draft.clone()).unwrap();
        let second = store.create_dataset(draft.clone()).unwrap();
        store.delete_dataset(second.id).unwrap();

        let third = store.create_dataset(draft).unwrap();
        assert_eq!(third.id, 3);
        assert!(store.get_dataset(2).is_err());
    }

    #[test]
    fn sequence_starts_above_existing_rows() {
        let root = tempfile::tempdir().unwrap();
        let store = Store::open(root.path()).unwrap();
        let rows = vec![FavoritePhrase {
            id: 7,
            phrase_from: "a".into(),
            phrase_to: "b".into(),
            language_from: "en".into(),
            language_to: None,
        }];
        store.save_table(FAVORITES, &rows).unwrap();

        let next = store
            .insert(FAVORITES, |id| FavoritePhrase { id, ..rows[0].clone() })
            .unwrap();
        assert_eq!(next.id, 8);
    }
}
