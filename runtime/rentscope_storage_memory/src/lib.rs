//! An in-memory key-value store for `rentscope_storage`, geared towards testing and ephemeral runs.
use std::{collections::HashMap, sync::Arc};
use tokio::sync::Mutex;

use rentscope_storage::{
    KeyValueBackend,
    errors::{GetError, RemoveError, SetError},
};

#[derive(Clone, Default)]
/// An in-memory key-value store.
///
/// # Limitations
///
/// This store won't persist data between process restarts.
/// It is primarily intended for testing.
pub struct InMemoryKeyValueStore(Arc<Mutex<HashMap<String, String>>>);

impl std::fmt::Debug for InMemoryKeyValueStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryKeyValueStore")
            .finish_non_exhaustive()
    }
}

impl InMemoryKeyValueStore {
    /// Creates a new (empty) in-memory key-value store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new in-memory key-value store, pre-populated with the given entries.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let entries = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self(Arc::new(Mutex::new(entries)))
    }

    /// The number of keys currently stored.
    pub async fn len(&self) -> usize {
        self.0.lock().await.len()
    }

    /// Returns `true` if there are no keys in the store.
    pub async fn is_empty(&self) -> bool {
        self.0.lock().await.is_empty()
    }
}

#[async_trait::async_trait]
impl KeyValueBackend for InMemoryKeyValueStore {
    #[tracing::instrument(
        name = "Read key",
        level = tracing::Level::TRACE,
        skip_all,
        fields(key = %key)
    )]
    async fn get(&self, key: &str) -> Result<Option<String>, GetError> {
        let guard = self.0.lock().await;
        Ok(guard.get(key).cloned())
    }

    #[tracing::instrument(
        name = "Write key",
        level = tracing::Level::TRACE,
        skip_all,
        fields(key = %key)
    )]
    async fn set(&self, key: &str, value: &str) -> Result<(), SetError> {
        let mut guard = self.0.lock().await;
        guard.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    #[tracing::instrument(
        name = "Remove key",
        level = tracing::Level::TRACE,
        skip_all,
        fields(key = %key)
    )]
    async fn remove(&self, key: &str) -> Result<(), RemoveError> {
        let mut guard = self.0.lock().await;
        guard.remove(key);
        Ok(())
    }
}
