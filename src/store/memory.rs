use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use super::{DocumentStore, StoreError};
use crate::models::ChunkRecord;

/// In-memory chunk store, optionally backed by a JSON Lines file.
///
/// Inserts append one line to the file. When the file is changed by another
/// process (the ingest binary) the next read reloads it.
pub struct MemoryStore {
    entries: RwLock<Vec<ChunkRecord>>,
    persist_path: Option<PathBuf>,
    /// mtime and length of the file at the last load
    loaded_at: Mutex<Option<(SystemTime, u64)>>,
}

impl MemoryStore {
    /// A store that lives only as long as the process.
    pub fn ephemeral() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            persist_path: None,
            loaded_at: Mutex::new(None),
        }
    }

    /// Open the store file at `path`, creating its directory if needed.
    pub fn open_or_create(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let store = Self {
            entries: RwLock::new(Vec::new()),
            persist_path: Some(path.to_path_buf()),
            loaded_at: Mutex::new(None),
        };
        store.reload_if_changed()?;
        Ok(store)
    }

    fn reload_if_changed(&self) -> Result<(), StoreError> {
        let Some(path) = &self.persist_path else {
            return Ok(());
        };
        if !path.exists() {
            return Ok(());
        }

        let stamp = file_stamp(path)?;
        let mut loaded_at = self.loaded_at.lock();
        if *loaded_at == Some(stamp) {
            return Ok(());
        }

        let entries = read_jsonl(path)?;
        tracing::debug!("Loaded {} chunk records from {}", entries.len(), path.display());
        *self.entries.write() = entries;
        *loaded_at = Some(stamp);
        Ok(())
    }

    fn append_to_disk(&self, record: &ChunkRecord) -> Result<(), StoreError> {
        let Some(path) = &self.persist_path else {
            return Ok(());
        };

        let mut line = serde_json::to_string(record)?;
        line.push('\n');
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        file.write_all(line.as_bytes())?;

        // Our own write must not trigger a reload
        *self.loaded_at.lock() = Some(file_stamp(path)?);
        Ok(())
    }
}

fn file_stamp(path: &Path) -> Result<(SystemTime, u64), StoreError> {
    let meta = std::fs::metadata(path)?;
    Ok((meta.modified()?, meta.len()))
}

fn read_jsonl(path: &Path) -> Result<Vec<ChunkRecord>, StoreError> {
    let reader = BufReader::new(std::fs::File::open(path)?);
    let mut entries = Vec::new();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<ChunkRecord>(&line) {
            Ok(record) => entries.push(record),
            Err(e) => {
                tracing::warn!("Skipping invalid record at {}:{}: {e}", path.display(), line_no + 1)
            }
        }
    }

    Ok(entries)
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert(&self, record: &ChunkRecord) -> Result<(), StoreError> {
        self.reload_if_changed()?;

        {
            let entries = self.entries.read();
            if let Some(first) = entries.first() {
                if first.embedding.len() != record.embedding.len() {
                    return Err(StoreError::DimensionMismatch {
                        expected: first.embedding.len(),
                        actual: record.embedding.len(),
                    });
                }
            }
        }

        self.append_to_disk(record)?;
        self.entries.write().push(record.clone());
        Ok(())
    }

    async fn all(&self) -> Result<Vec<ChunkRecord>, StoreError> {
        self.reload_if_changed()?;
        Ok(self.entries.read().clone())
    }

    async fn count(&self) -> Result<usize, StoreError> {
        self.reload_if_changed()?;
        Ok(self.entries.read().len())
    }
}
