use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing_log_error::log_error;

use crate::{LanguageCode, LocaleController, LocaleListener};

/// The locale families supported by the UI widget toolkit.
///
/// Widgets are localized independently of the translation catalog, with a
/// coarser granularity: every English variant shares the same module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UiLocaleFamily {
    ZhCn,
    En,
    ZhTw,
}

impl UiLocaleFamily {
    /// Prefix-match a language code against the supported families.
    ///
    /// Returns `None` if no family matches, in which case the UI locale is
    /// left untouched.
    pub fn for_code(code: &str) -> Option<Self> {
        if code.starts_with("zh-CN") {
            Some(Self::ZhCn)
        } else if code.starts_with("en") {
            Some(Self::En)
        } else if code.starts_with("zh-TW") {
            Some(Self::ZhTw)
        } else {
            None
        }
    }

    /// The name of the widget locale module for this family.
    pub fn module_name(self) -> &'static str {
        match self {
            Self::ZhCn => "zh-cn",
            Self::En => "en",
            Self::ZhTw => "zh-tw",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
/// A loaded widget locale module.
pub struct UiLocale {
    /// The module name, e.g. `zh-cn`.
    pub name: String,
    pub messages: BTreeMap<String, String>,
}

#[async_trait::async_trait]
/// Resolves the widget locale module for a family.
pub trait UiLocaleLoader: std::fmt::Debug + Send + Sync {
    async fn load(&self, family: UiLocaleFamily) -> Result<UiLocale, errors::UiLocaleLoadError>;
}

#[derive(Debug, Clone, Default)]
/// The widget locale modules embedded in the binary.
pub struct BundledUiLocales;

#[async_trait::async_trait]
impl UiLocaleLoader for BundledUiLocales {
    async fn load(&self, family: UiLocaleFamily) -> Result<UiLocale, errors::UiLocaleLoadError> {
        let source = match family {
            UiLocaleFamily::ZhCn => include_str!("../locales/ui/zh-cn.json"),
            UiLocaleFamily::En => include_str!("../locales/ui/en.json"),
            UiLocaleFamily::ZhTw => include_str!("../locales/ui/zh-tw.json"),
        };
        serde_json::from_str(source).map_err(|e| errors::UiLocaleLoadError {
            family,
            source: e.into(),
        })
    }
}

/// Keeps the widget locale in sync with the active language.
///
/// Every locale change spawns a resolution task on the runtime the adapter was
/// created with; the locale controller never waits for it.
///
/// # Races
///
/// In-flight resolutions are never cancelled. If two locale changes happen in
/// quick succession, the resolution that *completes* last wins, even if it was
/// started first.
pub struct UiLocaleAdapter {
    loader: Arc<dyn UiLocaleLoader>,
    runtime: Handle,
    current: Arc<RwLock<Option<UiLocale>>>,
    in_flight: Mutex<Vec<JoinHandle<()>>>,
}

impl std::fmt::Debug for UiLocaleAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UiLocaleAdapter")
            .field("loader", &self.loader)
            .field("current", &self.current().map(|l| l.name))
            .finish_non_exhaustive()
    }
}

impl UiLocaleAdapter {
    /// Create a new adapter. Resolutions will be spawned on `runtime`.
    pub fn new<L: UiLocaleLoader + 'static>(loader: L, runtime: Handle) -> Arc<Self> {
        Arc::new(Self {
            loader: Arc::new(loader),
            runtime,
            current: Arc::new(RwLock::new(None)),
            in_flight: Mutex::new(Vec::new()),
        })
    }

    /// Subscribe to `controller`'s locale changes and resolve the widget locale
    /// for its current locale.
    pub fn attach(self: &Arc<Self>, controller: &LocaleController) {
        controller.subscribe(self.clone());
        self.resolve(&controller.active());
    }

    /// The widget locale currently applied, if any resolution has completed.
    pub fn current(&self) -> Option<UiLocale> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Start resolving the widget locale for `code` in the background.
    pub fn resolve(&self, code: &LanguageCode) {
        let Some(family) = UiLocaleFamily::for_code(code.as_str()) else {
            tracing::trace!(%code, "No widget locale family matches, leaving it untouched");
            return;
        };
        let loader = self.loader.clone();
        let current = self.current.clone();
        let handle = self.runtime.spawn(async move {
            match loader.load(family).await {
                Ok(locale) => {
                    tracing::debug!(module = %locale.name, "Applied widget locale");
                    *current.write().unwrap_or_else(PoisonError::into_inner) = Some(locale);
                }
                Err(e) => {
                    log_error!(e, level: tracing::Level::WARN, "Failed to load the widget locale");
                }
            }
        });
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        in_flight.retain(|h| !h.is_finished());
        in_flight.push(handle);
    }

    /// Wait until every resolution started so far has settled.
    pub async fn flush(&self) {
        loop {
            let pending: Vec<_> = {
                let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
                in_flight.drain(..).collect()
            };
            if pending.is_empty() {
                return;
            }
            for handle in pending {
                if let Err(e) = handle.await {
                    log_error!(e, "A widget locale resolution task panicked");
                }
            }
        }
    }
}

impl LocaleListener for UiLocaleAdapter {
    fn locale_changed(&self, code: &LanguageCode) {
        self.resolve(code);
    }
}

pub mod errors {
    use super::UiLocaleFamily;

    #[derive(Debug, thiserror::Error)]
    #[error("Failed to load the `{}` widget locale module", .family.module_name())]
    pub struct UiLocaleLoadError {
        pub family: UiLocaleFamily,
        #[source]
        pub source: Box<dyn std::error::Error + Send + Sync>,
    }
}
