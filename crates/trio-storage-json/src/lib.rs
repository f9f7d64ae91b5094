use std::{
    cmp::Reverse,
    fs::{self, File},
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::debug;
use trio_core::{CoreError, DocumentKey, DocumentStore};

const DOCUMENT_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S%3f";
const TMP_SUFFIX: &str = "tmp";
const BACKUPS_DIR: &str = "backups";
pub const DEFAULT_RETENTION: usize = 5;

/// Filesystem-backed store keeping one JSON file per document plus rolling backups.
///
/// Layout under `root`: `<key>.json` for each document and
/// `backups/<key>/<key>_<timestamp>.json` for previous versions.
#[derive(Debug, Clone)]
pub struct JsonDocumentStore {
    root: PathBuf,
    backups_dir: PathBuf,
    retention: usize,
}

/// A previous version of a document kept under `backups/`.
#[derive(Debug, Clone)]
pub struct BackupInfo {
    pub key: DocumentKey,
    pub id: String,
    pub created_at: Option<DateTime<Utc>>,
    pub size_bytes: u64,
    pub path: PathBuf,
}

impl JsonDocumentStore {
    pub fn new(root: PathBuf) -> Result<Self, CoreError> {
        Self::with_retention(root, DEFAULT_RETENTION)
    }

    pub fn with_retention(root: PathBuf, retention: usize) -> Result<Self, CoreError> {
        let backups_dir = root.join(BACKUPS_DIR);
        fs::create_dir_all(&root)?;
        fs::create_dir_all(&backups_dir)?;
        Ok(Self {
            root,
            backups_dir,
            retention: retention.max(1),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn retention(&self) -> usize {
        self.retention
    }

    pub fn document_path(&self, key: DocumentKey) -> PathBuf {
        self.root
            .join(format!("{}.{}", key.as_str(), DOCUMENT_EXTENSION))
    }

    /// Backups of `key`, newest first.
    pub fn list_backups(&self, key: DocumentKey) -> Result<Vec<BackupInfo>, CoreError> {
        let dir = self.backup_dir(key);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(DOCUMENT_EXTENSION) {
                continue;
            }
            let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
                continue;
            };
            let size_bytes = entry.metadata().map(|meta| meta.len()).unwrap_or(0);
            entries.push(BackupInfo {
                key,
                id: file_name.to_string(),
                created_at: parse_backup_stamp(file_name).map(|(at, _)| at),
                size_bytes,
                path: path.clone(),
            });
        }
        entries.sort_by_key(|info| Reverse(parse_backup_stamp(&info.id)));
        Ok(entries)
    }

    /// Copies `backup` over the live document. The current document is backed
    /// up first, so a restore can itself be undone.
    pub fn restore_backup(&self, backup: &BackupInfo) -> Result<(), CoreError> {
        if !backup.path.exists() {
            return Err(CoreError::Persistence(format!(
                "backup `{}` not found",
                backup.id
            )));
        }
        let contents = fs::read_to_string(&backup.path)?;
        serde_json::from_str::<serde_json::Value>(&contents)
            .map_err(|err| CoreError::Serde(format!("{}: {err}", backup.id)))?;
        self.write(backup.key, &contents)?;
        debug!(document = %backup.key, backup = %backup.id, "backup restored");
        Ok(())
    }

    pub fn find_backup(&self, key: DocumentKey, id: &str) -> Result<BackupInfo, CoreError> {
        self.list_backups(key)?
            .into_iter()
            .find(|info| info.id == id)
            .ok_or_else(|| CoreError::Persistence(format!("backup `{id}` not found")))
    }

    fn backup_dir(&self, key: DocumentKey) -> PathBuf {
        self.backups_dir.join(key.as_str())
    }

    fn backup_existing_file(&self, key: DocumentKey, path: &Path) -> Result<(), CoreError> {
        if !path.exists() {
            return Ok(());
        }
        let dir = self.backup_dir(key);
        fs::create_dir_all(&dir)?;
        let stamp = Utc::now().format(BACKUP_TIMESTAMP_FORMAT).to_string();
        let mut file_name = format!("{}_{}.{}", key.as_str(), stamp, DOCUMENT_EXTENSION);
        let mut seq = 0u32;
        while dir.join(&file_name).exists() {
            seq += 1;
            file_name = format!("{}_{}_{}.{}", key.as_str(), stamp, seq, DOCUMENT_EXTENSION);
        }
        fs::copy(path, dir.join(&file_name))?;
        self.prune_backups(key)
    }

    fn prune_backups(&self, key: DocumentKey) -> Result<(), CoreError> {
        for entry in self.list_backups(key)?.into_iter().skip(self.retention) {
            let _ = fs::remove_file(entry.path);
        }
        Ok(())
    }
}

impl DocumentStore for JsonDocumentStore {
    fn read(&self, key: DocumentKey) -> Result<Option<String>, CoreError> {
        match fs::read_to_string(self.document_path(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn write(&self, key: DocumentKey, contents: &str) -> Result<(), CoreError> {
        let path = self.document_path(key);
        self.backup_existing_file(key, &path)?;
        let tmp = tmp_path(&path);
        write_atomic(&tmp, contents)?;
        fs::rename(&tmp, &path)?;
        debug!(document = %key, path = %path.display(), "document written");
        Ok(())
    }
}

/// Timestamp and collision counter encoded in a backup file name.
fn parse_backup_stamp(name: &str) -> Option<(DateTime<Utc>, u32)> {
    let trimmed = name.strip_suffix(&format!(".{}", DOCUMENT_EXTENSION))?;
    let mut segments = trimmed.split('_').collect::<Vec<_>>();
    let seq = match segments.last() {
        Some(last) if is_digits(last, None) && last.len() < 9 => {
            let seq = last.parse().ok()?;
            segments.pop();
            seq
        }
        _ => 0,
    };
    let time = segments.pop()?;
    let date = segments.pop()?;
    if !is_digits(date, Some(8)) || !is_digits(time, Some(9)) {
        return None;
    }
    let raw = format!("{date}{time}");
    NaiveDateTime::parse_from_str(&raw, "%Y%m%d%H%M%S%3f")
        .ok()
        .map(|naive| (DateTime::from_naive_utc_and_offset(naive, Utc), seq))
}

fn is_digits(value: &str, len: Option<usize>) -> bool {
    !value.is_empty()
        && len.map_or(true, |len| value.len() == len)
        && value.chars().all(|c| c.is_ascii_digit())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    file.sync_all()?;
    Ok(())
}
