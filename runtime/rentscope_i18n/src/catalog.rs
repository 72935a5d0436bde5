use std::collections::HashMap;

use serde_json::Value;

use crate::LanguageCode;

/// Translation messages, keyed by locale.
///
/// Messages are nested JSON objects addressed with dotted keys:
/// `nav.taskList` resolves to `{"nav": {"taskList": "..."}}`.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    messages: HashMap<LanguageCode, Value>,
}

impl Catalog {
    /// An empty catalog. Every lookup misses.
    pub fn new() -> Self {
        Self::default()
    }

    /// The catalogs bundled with the client for `zh-CN`, `en-US` and `zh-TW`.
    pub fn bundled() -> Result<Self, errors::CatalogError> {
        let mut catalog = Self::new();
        catalog.add_json(LanguageCode::ZH_CN, include_str!("../locales/zh-CN.json"))?;
        catalog.add_json(LanguageCode::EN_US, include_str!("../locales/en-US.json"))?;
        catalog.add_json(LanguageCode::ZH_TW, include_str!("../locales/zh-TW.json"))?;
        Ok(catalog)
    }

    /// Register the messages for a locale, replacing any previous entry.
    pub fn add_json(
        &mut self,
        locale: LanguageCode,
        source: &str,
    ) -> Result<(), errors::CatalogError> {
        let messages: Value =
            serde_json::from_str(source).map_err(|e| errors::CatalogError {
                locale: locale.clone(),
                source: e,
            })?;
        self.messages.insert(locale, messages);
        Ok(())
    }

    /// `true` if messages were registered for `locale`.
    pub fn has_locale(&self, locale: &LanguageCode) -> bool {
        self.messages.contains_key(locale)
    }

    /// Look up `key` in `locale`'s messages only.
    ///
    /// Only string leaves count as translations.
    pub fn get(&self, locale: &LanguageCode, key: &str) -> Option<&str> {
        let mut node = self.messages.get(locale)?;
        for segment in key.split('.') {
            node = node.as_object()?.get(segment)?;
        }
        node.as_str()
    }

    /// Look up `key` in `locale`, then in `fallback`.
    pub fn translate(
        &self,
        locale: &LanguageCode,
        fallback: &LanguageCode,
        key: &str,
    ) -> Option<&str> {
        self.get(locale, key).or_else(|| {
            tracing::trace!(%locale, key, "Missing translation, trying the fallback locale");
            self.get(fallback, key)
        })
    }
}

pub mod errors {
    use crate::LanguageCode;

    #[derive(Debug, thiserror::Error)]
    #[error("The message catalog for `{locale}` is not valid JSON")]
    pub struct CatalogError {
        pub locale: LanguageCode,
        #[source]
        pub source: serde_json::Error,
    }
}
