use errors::{GetError, RemoveError, SetError};
use std::sync::Arc;

/// Where durable client-side state is stored.
///
/// It is a thin wrapper
/// [around your chosen storage backend implementation][`KeyValueBackend`],
/// removing the need to specify the concrete type of the storage backend
/// everywhere in your code.
///
/// Cloning a [`KeyValueStore`] is cheap: all clones share the same backend.
#[derive(Debug, Clone)]
pub struct KeyValueStore(Arc<dyn KeyValueBackend>);

impl KeyValueStore {
    /// Creates a new key-value store using the provided backend.
    pub fn new<Backend>(backend: Backend) -> Self
    where
        Backend: KeyValueBackend + 'static,
    {
        Self(Arc::new(backend))
    }

    /// Retrieve the value associated with `key`, if there is one.
    pub async fn get(&self, key: &str) -> Result<Option<String>, GetError> {
        self.0.get(key).await
    }

    /// Associate `value` with `key`, overwriting any previous value.
    pub async fn set(&self, key: &str, value: &str) -> Result<(), SetError> {
        self.0.set(key, value).await
    }

    /// Remove the value associated with `key`.
    ///
    /// Removing a key that isn't there is a no-op.
    pub async fn remove(&self, key: &str) -> Result<(), RemoveError> {
        self.0.remove(key).await
    }
}

#[async_trait::async_trait]
/// The interface of a key-value storage backend.
pub trait KeyValueBackend: std::fmt::Debug + Send + Sync {
    /// Retrieve the value associated with `key`, if there is one.
    async fn get(&self, key: &str) -> Result<Option<String>, GetError>;

    /// Associate `value` with `key`, overwriting any previous value.
    ///
    /// The write must be atomic with respect to other writes on the same key.
    async fn set(&self, key: &str, value: &str) -> Result<(), SetError>;

    /// Remove the value associated with `key`.
    ///
    /// Removing a key that isn't there must succeed.
    async fn remove(&self, key: &str) -> Result<(), RemoveError>;
}

pub mod errors {
    #[non_exhaustive]
    #[derive(Debug, thiserror::Error)]
    /// The error returned by [`KeyValueBackend::get`][super::KeyValueBackend::get].
    pub enum GetError {
        /// The underlying storage could not be decoded.
        #[error("Failed to decode the content of the key-value store.")]
        DeserializationError(#[from] serde_json::Error),
        /// Something else went wrong when reading the value.
        #[error("Something went wrong when reading `{key}` from the key-value store.")]
        Other {
            key: String,
            #[source]
            source: anyhow::Error,
        },
    }

    #[non_exhaustive]
    #[derive(Debug, thiserror::Error)]
    /// The error returned by [`KeyValueBackend::set`][super::KeyValueBackend::set].
    pub enum SetError {
        /// The updated storage could not be encoded.
        #[error("Failed to encode the content of the key-value store.")]
        SerializationError(#[from] serde_json::Error),
        /// Something else went wrong when writing the value.
        #[error("Something went wrong when writing `{key}` to the key-value store.")]
        Other {
            key: String,
            #[source]
            source: anyhow::Error,
        },
    }

    #[non_exhaustive]
    #[derive(Debug, thiserror::Error)]
    /// The error returned by [`KeyValueBackend::remove`][super::KeyValueBackend::remove].
    pub enum RemoveError {
        /// The updated storage could not be encoded.
        #[error("Failed to encode the content of the key-value store.")]
        SerializationError(#[from] serde_json::Error),
        /// Something else went wrong when removing the value.
        #[error("Something went wrong when removing `{key}` from the key-value store.")]
        Other {
            key: String,
            #[source]
            source: anyhow::Error,
        },
    }
}
