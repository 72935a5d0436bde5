use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use rentscope_i18n::{
    BundledUiLocales, Catalog, HeadlessDocument, LocaleController, LocaleListener, LanguageCode,
    UiLocale, UiLocaleFamily, UiLocaleLoader, errors::UiLocaleLoadError,
};
use rentscope_storage::KeyValueStore;
use rentscope_storage_memory::InMemoryKeyValueStore;
use tokio::sync::oneshot;

pub struct Harness {
    pub controller: LocaleController,
    pub document: Arc<HeadlessDocument>,
    pub store: KeyValueStore,
}

/// A controller initialized on top of a store holding `entries`.
pub async fn harness<const N: usize>(
    entries: [(&str, &str); N],
    host_language: Option<&str>,
) -> Harness {
    let store = KeyValueStore::new(InMemoryKeyValueStore::with_entries(entries));
    let document = Arc::new(HeadlessDocument::new());
    let controller = LocaleController::initialize(
        store.clone(),
        document.clone(),
        Catalog::bundled().unwrap(),
        host_language,
    )
    .await
    .unwrap();
    Harness {
        controller,
        document,
        store,
    }
}

/// Records every notification it receives.
#[derive(Default)]
pub struct RecordingListener(Mutex<Vec<LanguageCode>>);

impl RecordingListener {
    pub fn received(&self) -> Vec<LanguageCode> {
        self.0.lock().unwrap().clone()
    }
}

impl LocaleListener for RecordingListener {
    fn locale_changed(&self, code: &LanguageCode) {
        self.0.lock().unwrap().push(code.clone());
    }
}

/// A loader that holds each family back until its gate is opened.
///
/// Families without a gate load immediately.
#[derive(Debug, Clone, Default)]
pub struct GatedLoader {
    gates: Arc<Mutex<HashMap<UiLocaleFamily, oneshot::Receiver<()>>>>,
}

impl GatedLoader {
    pub fn gate(&self, family: UiLocaleFamily) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().insert(family, rx);
        tx
    }
}

#[async_trait::async_trait]
impl UiLocaleLoader for GatedLoader {
    async fn load(&self, family: UiLocaleFamily) -> Result<UiLocale, UiLocaleLoadError> {
        let gate = self.gates.lock().unwrap().remove(&family);
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        BundledUiLocales.load(family).await
    }
}

/// A loader that always fails.
#[derive(Debug, Clone, Default)]
pub struct BrokenLoader;

#[async_trait::async_trait]
impl UiLocaleLoader for BrokenLoader {
    async fn load(&self, family: UiLocaleFamily) -> Result<UiLocale, UiLocaleLoadError> {
        Err(UiLocaleLoadError {
            family,
            source: "module not found".into(),
        })
    }
}

/// Yield to the scheduler until `condition` holds.
pub async fn eventually(mut condition: impl FnMut() -> bool) {
    for _ in 0..1_000 {
        if condition() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("The condition was never satisfied");
}
