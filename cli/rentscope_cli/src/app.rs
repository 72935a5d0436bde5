use std::sync::Arc;

use anyhow::Context;
use camino::Utf8PathBuf;
use rentscope_client::GatewayClient;
use rentscope_i18n::{
    BundledUiLocales, Catalog, HeadlessDocument, LocaleController, UiLocaleAdapter,
};
use rentscope_router::{InMemoryNavigator, NavigationGuard, RouteTable};
use rentscope_storage::KeyValueStore;
use rentscope_storage_file::JsonFileKeyValueStore;

use crate::config::CliConfig;

/// The client runtime, wired together on top of a file-backed store.
pub struct App {
    pub client: GatewayClient,
    pub guard: NavigationGuard,
    pub locale: Arc<LocaleController>,
    pub ui_locale: Arc<UiLocaleAdapter>,
    pub navigator: Arc<InMemoryNavigator>,
    pub document: Arc<HeadlessDocument>,
}

impl App {
    /// Assemble the runtime.
    ///
    /// `location` is where the user is assumed to be when the command starts.
    pub async fn assemble(
        config: CliConfig,
        storage_path: Utf8PathBuf,
        location: &str,
    ) -> Result<Self, anyhow::Error> {
        tracing::debug!(%storage_path, "Opening the key-value store");
        let store = KeyValueStore::new(JsonFileKeyValueStore::new(storage_path));

        let document = Arc::new(HeadlessDocument::new());
        let catalog = Catalog::bundled().context("Failed to load the bundled translations")?;
        let host_language = host_language();
        let locale = LocaleController::initialize(
            store.clone(),
            document.clone(),
            catalog,
            host_language.as_deref(),
        )
        .await
        .context("Failed to determine the active language")?;
        let locale = Arc::new(locale);

        let ui_locale = UiLocaleAdapter::new(BundledUiLocales, tokio::runtime::Handle::current());
        ui_locale.attach(&locale);

        let navigator = Arc::new(InMemoryNavigator::new(location));
        let client = GatewayClient::builder(
            config.gateway,
            store,
            locale.clone(),
            navigator.clone(),
        )
        .build();

        let routes = RouteTable::application().context("Failed to build the route table")?;
        let guard =
            NavigationGuard::new(Arc::new(routes), client.session().clone(), locale.clone());

        Ok(Self {
            client,
            guard,
            locale,
            ui_locale,
            navigator,
            document,
        })
    }
}

/// The language reported by the host, from the usual POSIX variables.
fn host_language() -> Option<String> {
    ["LC_ALL", "LC_MESSAGES", "LANG"]
        .into_iter()
        .filter_map(|var| std::env::var(var).ok())
        .find_map(|value| reported_language(&value).map(ToOwned::to_owned))
}

/// Strip the encoding and modifier from a POSIX locale name.
///
/// The `C` and `POSIX` locales don't name a language.
fn reported_language(posix_locale: &str) -> Option<&str> {
    let language = posix_locale
        .split(['.', '@'])
        .next()
        .unwrap_or_default()
        .trim();
    match language {
        "" | "C" | "POSIX" => None,
        language => Some(language),
    }
}
