use std::sync::{Arc, PoisonError, RwLock};

use rentscope_storage::{KeyValueStore, keys};

use crate::{Catalog, Document, LanguageCode, LocaleInfo, LocaleState, resolve_host_language};

/// Notified, synchronously, every time the active locale changes.
///
/// Implementations must not block: anything slow belongs on a spawned task.
pub trait LocaleListener: Send + Sync {
    fn locale_changed(&self, code: &LanguageCode);
}

/// The single owner of the active language.
///
/// All locale changes go through [`LocaleController::set_locale`].
pub struct LocaleController {
    state: RwLock<LocaleState>,
    listeners: RwLock<Vec<Arc<dyn LocaleListener>>>,
    /// Serializes locale switches, so the persisted language always matches the active one.
    switching: tokio::sync::Mutex<()>,
    catalog: Catalog,
    store: KeyValueStore,
    document: Arc<dyn Document>,
}

impl std::fmt::Debug for LocaleController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocaleController")
            .field("state", &self.state())
            .field("document", &self.document)
            .finish_non_exhaustive()
    }
}

impl LocaleController {
    /// Resolve the initial locale and mirror it to the document.
    ///
    /// The initial locale is, in order of preference:
    ///
    /// 1. The language persisted in `store`, if it is one of the available locales.
    /// 2. The language reported by the host environment, if any.
    /// 3. The fallback locale.
    ///
    /// Nothing is written to the store.
    pub async fn initialize(
        store: KeyValueStore,
        document: Arc<dyn Document>,
        catalog: Catalog,
        host_language: Option<&str>,
    ) -> Result<Self, errors::InitError> {
        let mut state = LocaleState::default();
        let persisted = store.get(keys::LANGUAGE).await?;
        state.active = match persisted {
            Some(code) if state.is_available(&code) => LanguageCode::new(code),
            Some(code) => {
                tracing::warn!(%code, "Ignoring the persisted language: it is not available");
                Self::from_host(host_language, &state)
            }
            None => Self::from_host(host_language, &state),
        };
        tracing::debug!(active = %state.active, "Initial locale resolved");
        Ok(Self::with_state(store, document, catalog, state))
    }

    /// Build a controller around a pre-computed state, mirroring the active
    /// locale to the document.
    pub fn with_state(
        store: KeyValueStore,
        document: Arc<dyn Document>,
        catalog: Catalog,
        state: LocaleState,
    ) -> Self {
        document.set_lang(state.active.as_str());
        Self {
            state: RwLock::new(state),
            listeners: RwLock::new(Vec::new()),
            switching: tokio::sync::Mutex::new(()),
            catalog,
            store,
            document,
        }
    }

    fn from_host(host_language: Option<&str>, state: &LocaleState) -> LanguageCode {
        host_language
            .map(resolve_host_language)
            .unwrap_or_else(|| state.fallback.clone())
    }

    /// A copy of the current state.
    pub fn state(&self) -> LocaleState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn active(&self) -> LanguageCode {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .active
            .clone()
    }

    pub fn fallback(&self) -> LanguageCode {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .fallback
            .clone()
    }

    pub fn available(&self) -> Vec<LocaleInfo> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .available
            .clone()
    }

    /// The document the active locale is mirrored to.
    pub fn document(&self) -> &Arc<dyn Document> {
        &self.document
    }

    /// Translate `key` in the active locale, falling back to the fallback locale.
    pub fn translate(&self, key: &str) -> Option<String> {
        let (active, fallback) = {
            let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
            (state.active.clone(), state.fallback.clone())
        };
        self.catalog
            .translate(&active, &fallback, key)
            .map(ToOwned::to_owned)
    }

    /// Register a listener for locale changes.
    pub fn subscribe(&self, listener: Arc<dyn LocaleListener>) {
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
    }

    /// Switch the active locale.
    ///
    /// In order:
    ///
    /// 1. The active locale is updated.
    /// 2. The code is persisted under the `language` key.
    /// 3. The document language attribute is updated.
    /// 4. Listeners are notified.
    ///
    /// Codes that are not available are replaced by the fallback locale: the
    /// fallback is activated, persisted and mirrored to the document, while the
    /// requested code is *not* persisted. Listeners are *not* notified.
    ///
    /// Concurrent calls are applied one at a time, in the order they acquire the
    /// switch lock: the last one to run determines both the active and the persisted
    /// language.
    ///
    /// Listeners run synchronously but must not block, so this method never waits
    /// for a widget locale to load.
    ///
    /// If persisting fails, the in-memory state and the document are still updated
    /// and the error is returned afterwards.
    ///
    /// Returns the locale that is now active.
    pub async fn set_locale(&self, code: &str) -> Result<LanguageCode, errors::SetLocaleError> {
        let _switching = self.switching.lock().await;
        let (active, recognized) = {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            let recognized = state.is_available(code);
            state.active = if recognized {
                LanguageCode::new(code)
            } else {
                tracing::warn!(
                    code,
                    fallback = %state.fallback,
                    "Unknown locale, using the fallback"
                );
                state.fallback.clone()
            };
            (state.active.clone(), recognized)
        };

        let persisted = self.store.set(keys::LANGUAGE, active.as_str()).await;
        self.document.set_lang(active.as_str());

        if recognized {
            let listeners = self
                .listeners
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .clone();
            for listener in listeners {
                listener.locale_changed(&active);
            }
        }

        persisted.map_err(|e| errors::SetLocaleError {
            code: active.clone(),
            source: e,
        })?;
        Ok(active)
    }
}

pub mod errors {
    use rentscope_storage::errors::{GetError, SetError};

    use crate::LanguageCode;

    #[non_exhaustive]
    #[derive(Debug, thiserror::Error)]
    pub enum InitError {
        #[error("Failed to read the persisted language")]
        Storage(#[from] GetError),
    }

    #[derive(Debug, thiserror::Error)]
    #[error("Switched to `{code}`, but failed to persist it")]
    pub struct SetLocaleError {
        pub code: LanguageCode,
        #[source]
        pub source: SetError,
    }
}
