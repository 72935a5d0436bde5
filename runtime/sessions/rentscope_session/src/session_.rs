use errors::{LoadError, SaveError};
use redact::Secret;
use rentscope_storage::{KeyValueStore, keys};

use crate::User;

#[derive(Debug, Clone)]
/// The current client session.
///
/// Cloning a [`Session`] is cheap: clones share the same underlying store.
pub struct Session {
    store: KeyValueStore,
}

#[derive(Debug, Clone, Default)]
/// A point-in-time copy of the session state.
pub struct SessionSnapshot {
    /// The bearer token, if the user is logged in.
    pub token: Option<Secret<String>>,
    /// The cached user object.
    pub user: Option<User>,
    /// The transient role override.
    pub role_override: Option<String>,
}

impl SessionSnapshot {
    /// `true` if none of the session fields are set.
    pub fn is_empty(&self) -> bool {
        self.token.is_none() && self.user.is_none() && self.role_override.is_none()
    }
}

impl Session {
    /// Create a session view on top of the given store.
    pub fn new(store: KeyValueStore) -> Self {
        Self { store }
    }

    /// The bearer token of the current session, if there is one.
    pub async fn token(&self) -> Result<Option<Secret<String>>, LoadError> {
        let token = self.read(keys::TOKEN).await?;
        Ok(token.map(Secret::new))
    }

    /// `true` if a session token is present.
    pub async fn is_authenticated(&self) -> Result<bool, LoadError> {
        Ok(self.read(keys::TOKEN).await?.is_some())
    }

    /// The user object cached at login time, if there is one.
    pub async fn user(&self) -> Result<Option<User>, LoadError> {
        let Some(raw) = self.read(keys::USER).await? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(LoadError::InvalidUser)
    }

    /// The transient role override, if one is set.
    pub async fn role_override(&self) -> Result<Option<String>, LoadError> {
        self.read(keys::ROLE_OVERRIDE).await
    }

    /// The role that should be used to authorize requests.
    ///
    /// The role override wins, if set.
    /// Otherwise, it's the role embedded in the cached user object, if any.
    pub async fn effective_role(&self) -> Result<Option<String>, LoadError> {
        if let Some(role) = self.role_override().await? {
            return Ok(Some(role));
        }
        let user = self.user().await?;
        Ok(user.and_then(|u| u.role().map(ToOwned::to_owned)))
    }

    /// Read the whole session state.
    pub async fn snapshot(&self) -> Result<SessionSnapshot, LoadError> {
        Ok(SessionSnapshot {
            token: self.token().await?,
            user: self.user().await?,
            role_override: self.role_override().await?,
        })
    }

    /// Start a new session with the token and the user returned by the backend.
    ///
    /// Both values are written to the store before this method returns.
    pub async fn login(&self, token: Secret<String>, user: &User) -> Result<(), SaveError> {
        let user = serde_json::to_string(user)?;
        self.store.set(keys::TOKEN, token.expose_secret()).await?;
        self.store.set(keys::USER, &user).await?;
        tracing::debug!("Started a new session");
        Ok(())
    }

    /// Replace the cached user object, e.g. after a profile update.
    ///
    /// The token and the role override are left untouched.
    pub async fn update_user(&self, user: &User) -> Result<(), SaveError> {
        let user = serde_json::to_string(user)?;
        self.store.set(keys::USER, &user).await?;
        Ok(())
    }

    /// Set (or clear, with `None`) the transient role override.
    pub async fn set_role_override(&self, role: Option<&str>) -> Result<(), SaveError> {
        match role {
            Some(role) => self.store.set(keys::ROLE_OVERRIDE, role).await?,
            None => self.store.remove(keys::ROLE_OVERRIDE).await?,
        }
        Ok(())
    }

    /// Destroy the session.
    ///
    /// Token, cached user and role override are all removed from the store
    /// before this method returns.
    /// Logging out of an empty session is a no-op.
    pub async fn logout(&self) -> Result<(), SaveError> {
        self.store.remove(keys::TOKEN).await?;
        self.store.remove(keys::USER).await?;
        self.store.remove(keys::ROLE_OVERRIDE).await?;
        tracing::debug!("Session cleared");
        Ok(())
    }

    /// Empty strings are treated as missing values.
    async fn read(&self, key: &str) -> Result<Option<String>, LoadError> {
        let value = self.store.get(key).await?;
        Ok(value.filter(|v| !v.is_empty()))
    }
}

pub mod errors {
    use rentscope_storage::errors::{GetError, RemoveError, SetError};

    #[non_exhaustive]
    #[derive(Debug, thiserror::Error)]
    /// The error returned when reading the session state.
    pub enum LoadError {
        #[error(transparent)]
        /// The store could not be read.
        Storage(#[from] GetError),
        #[error("The cached user object is not valid JSON.")]
        /// The cached user object couldn't be deserialized.
        InvalidUser(#[source] serde_json::Error),
    }

    #[non_exhaustive]
    #[derive(Debug, thiserror::Error)]
    /// The error returned when mutating the session state.
    pub enum SaveError {
        #[error("Failed to serialize the user object.")]
        /// The user object couldn't be serialized.
        SerializationError(#[from] serde_json::Error),
        #[error(transparent)]
        /// A value couldn't be written to the store.
        Write(#[from] SetError),
        #[error(transparent)]
        /// A value couldn't be removed from the store.
        Remove(#[from] RemoveError),
    }
}
