//! A durable key-value store for `rentscope_storage`, backed by a single JSON file.
//!
//! It plays the role that local storage plays in a browser: values survive
//! process restarts.
use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use tokio::sync::Mutex;

use rentscope_storage::{
    KeyValueBackend,
    errors::{GetError, RemoveError, SetError},
};

type Entries = BTreeMap<String, String>;

/// A key-value store persisted as a JSON object on disk.
///
/// # Atomicity
///
/// Each write rewrites the whole file: the new content is first written to a
/// temporary sibling file, which is then renamed over the original.
/// Writers within the same process are serialized; the file is never observed
/// half-written.
///
/// A missing file is treated as an empty store. Parent directories are created
/// on the first write.
pub struct JsonFileKeyValueStore {
    path: Utf8PathBuf,
    lock: Mutex<()>,
}

impl std::fmt::Debug for JsonFileKeyValueStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonFileKeyValueStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl JsonFileKeyValueStore {
    /// Use the file at `path` as storage.
    ///
    /// Nothing is read or written until the first operation.
    pub fn new<P>(path: P) -> Self
    where
        P: Into<Utf8PathBuf>,
    {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// The path of the backing file.
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    async fn read_entries(&self) -> Result<Entries, ReadError> {
        let contents = match fs_err::tokio::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Entries::new()),
            Err(e) => return Err(ReadError::Io(e.into())),
        };
        if contents.trim().is_empty() {
            return Ok(Entries::new());
        }
        Ok(serde_json::from_str(&contents)?)
    }

    async fn write_entries(&self, entries: &Entries) -> Result<(), WriteError> {
        let contents = serde_json::to_vec_pretty(entries)?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_str().is_empty() {
                fs_err::tokio::create_dir_all(parent)
                    .await
                    .context("Failed to create the parent directory of the storage file")?;
            }
        }
        let tmp_path = self.path.with_extension("json.tmp");
        fs_err::tokio::write(&tmp_path, contents)
            .await
            .context("Failed to write the temporary storage file")?;
        fs_err::tokio::rename(&tmp_path, &self.path)
            .await
            .context("Failed to replace the storage file")?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl KeyValueBackend for JsonFileKeyValueStore {
    #[tracing::instrument(
        name = "Read key",
        level = tracing::Level::TRACE,
        skip_all,
        fields(key = %key)
    )]
    async fn get(&self, key: &str) -> Result<Option<String>, GetError> {
        let _guard = self.lock.lock().await;
        match self.read_entries().await {
            Ok(mut entries) => Ok(entries.remove(key)),
            Err(ReadError::Decode(e)) => Err(GetError::DeserializationError(e)),
            Err(ReadError::Io(e)) => Err(GetError::Other {
                key: key.to_owned(),
                source: e,
            }),
        }
    }

    #[tracing::instrument(
        name = "Write key",
        level = tracing::Level::TRACE,
        skip_all,
        fields(key = %key)
    )]
    async fn set(&self, key: &str, value: &str) -> Result<(), SetError> {
        let _guard = self.lock.lock().await;
        let mut entries = self.read_entries().await.map_err(|e| SetError::Other {
            key: key.to_owned(),
            source: e.into(),
        })?;
        entries.insert(key.to_owned(), value.to_owned());
        self.write_entries(&entries).await.map_err(|e| match e {
            WriteError::Encode(e) => SetError::SerializationError(e),
            WriteError::Io(e) => SetError::Other {
                key: key.to_owned(),
                source: e,
            },
        })
    }

    #[tracing::instrument(
        name = "Remove key",
        level = tracing::Level::TRACE,
        skip_all,
        fields(key = %key)
    )]
    async fn remove(&self, key: &str) -> Result<(), RemoveError> {
        let _guard = self.lock.lock().await;
        let mut entries = self.read_entries().await.map_err(|e| RemoveError::Other {
            key: key.to_owned(),
            source: e.into(),
        })?;
        if entries.remove(key).is_none() {
            return Ok(());
        }
        self.write_entries(&entries).await.map_err(|e| match e {
            WriteError::Encode(e) => RemoveError::SerializationError(e),
            WriteError::Io(e) => RemoveError::Other {
                key: key.to_owned(),
                source: e,
            },
        })
    }
}

#[derive(Debug, thiserror::Error)]
enum ReadError {
    #[error("Failed to decode the storage file")]
    Decode(#[from] serde_json::Error),
    #[error(transparent)]
    Io(anyhow::Error),
}

#[derive(Debug, thiserror::Error)]
enum WriteError {
    #[error("Failed to encode the storage file")]
    Encode(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] anyhow::Error),
}
