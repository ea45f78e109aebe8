use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;

use super::error::StorageError;

/// Directory-backed store for uploaded files.
///
/// Files are kept flat under `{base_path}/{filename}`. Incoming data is first
/// written to `{base_path}/.tmp/` and only moved into place once it has been
/// received completely and within the size limit.
pub struct UploadStore {
    base_path: PathBuf,
    max_size: u64,
}

/// A file that has been committed to the upload directory.
#[derive(Debug, Clone)]
pub struct StoredUpload {
    pub path: PathBuf,
    pub size: u64,
}

impl UploadStore {
    /// Create the store, creating the upload and staging directories if needed.
    pub async fn new(base_path: PathBuf, max_size: u64) -> Result<Self, StorageError> {
        fs::create_dir_all(&base_path).await?;
        fs::create_dir_all(base_path.join(".tmp")).await?;
        Ok(Self {
            base_path,
            max_size,
        })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn max_size(&self) -> u64 {
        self.max_size
    }

    /// Path a file with the given name would be stored at.
    pub fn path_for(&self, filename: &str) -> Result<PathBuf, StorageError> {
        ensure_plain_filename(filename)?;
        Ok(self.base_path.join(filename))
    }

    /// Open a staging file for an upload that will be stored as `filename`.
    pub async fn stage(&self, filename: &str) -> Result<StagedUpload, StorageError> {
        let final_path = self.path_for(filename)?;
        let temp_path = self
            .base_path
            .join(".tmp")
            .join(uuid::Uuid::new_v4().to_string());
        let file = fs::File::create(&temp_path).await?;

        Ok(StagedUpload {
            temp_path,
            final_path,
            file: Some(file),
            written: 0,
            limit: self.max_size,
            committed: false,
        })
    }
}

/// An upload being received into the staging area.
///
/// Dropping it without calling [`StagedUpload::commit`] removes the staging file.
pub struct StagedUpload {
    temp_path: PathBuf,
    final_path: PathBuf,
    file: Option<fs::File>,
    written: u64,
    limit: u64,
    committed: bool,
}

impl StagedUpload {
    /// Append a chunk, failing as soon as the total exceeds the size limit.
    pub async fn write_chunk(&mut self, chunk: &[u8]) -> Result<(), StorageError> {
        let total = self.written + chunk.len() as u64;
        if total > self.limit {
            return Err(StorageError::SizeLimitExceeded {
                actual: total,
                limit: self.limit,
            });
        }

        let file = self
            .file
            .as_mut()
            .ok_or_else(|| std::io::Error::other("staging file already closed"))?;
        file.write_all(chunk).await?;
        self.written = total;
        Ok(())
    }

    /// Bytes accepted so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Move the staged data to its final location, replacing any file of the same name.
    pub async fn commit(mut self) -> Result<StoredUpload, StorageError> {
        if let Some(mut file) = self.file.take() {
            file.flush().await?;
        }

        fs::rename(&self.temp_path, &self.final_path).await?;
        self.committed = true;

        Ok(StoredUpload {
            path: self.final_path.clone(),
            size: self.written,
        })
    }
}

impl Drop for StagedUpload {
    fn drop(&mut self) {
        if !self.committed {
            drop(self.file.take());
            let _ = std::fs::remove_file(&self.temp_path);
        }
    }
}

fn ensure_plain_filename(filename: &str) -> Result<(), StorageError> {
    let is_plain = !filename.is_empty()
        && !filename.starts_with('.')
        && Path::new(filename).file_name().and_then(|n| n.to_str()) == Some(filename);
    if is_plain {
        Ok(())
    } else {
        Err(StorageError::InvalidFilename(filename.to_string()))
    }
}
