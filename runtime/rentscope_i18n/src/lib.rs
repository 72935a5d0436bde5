//! Locale management for the Rentscope client runtime.
//!
//! There are two independent localization layers:
//!
//! - The **translation catalog** ([`Catalog`]), used to render application
//!   strings. It switches synchronously.
//! - The **widget locale** ([`UiLocale`]), used by the UI toolkit for its own
//!   strings (date pickers, pagination, ...). It is loaded asynchronously by a
//!   [`UiLocaleAdapter`].
//!
//! [`LocaleController`] owns the active language and keeps both layers, the
//! persisted `language` key and the document's `lang` attribute in sync.
mod catalog;
mod controller;
mod document;
mod locale;
mod ui_locale;

pub use catalog::Catalog;
pub use controller::{LocaleController, LocaleListener};
pub use document::{Document, HeadlessDocument};
pub use locale::{LanguageCode, LocaleInfo, LocaleState, available_locales, resolve_host_language};
pub use ui_locale::{BundledUiLocales, UiLocale, UiLocaleAdapter, UiLocaleFamily, UiLocaleLoader};

/// The title used when a route has no translated title.
pub const APP_NAME: &str = "租房数据分析系统";

pub mod errors {
    //! Errors that can occur when managing locales.
    pub use crate::catalog::errors::*;
    pub use crate::controller::errors::*;
    pub use crate::ui_locale::errors::*;
}
