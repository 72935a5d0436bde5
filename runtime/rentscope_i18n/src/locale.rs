use std::borrow::Cow;
use std::fmt;

/// A BCP 47-ish language code, e.g. `zh-CN` or `en-US`.
///
/// No normalization is performed: codes are compared verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct LanguageCode(Cow<'static, str>);

impl LanguageCode {
    /// Simplified Chinese, the fallback locale.
    pub const ZH_CN: LanguageCode = LanguageCode(Cow::Borrowed("zh-CN"));
    /// American English.
    pub const EN_US: LanguageCode = LanguageCode(Cow::Borrowed("en-US"));
    /// Traditional Chinese.
    pub const ZH_TW: LanguageCode = LanguageCode(Cow::Borrowed("zh-TW"));

    pub fn new(code: impl Into<String>) -> Self {
        Self(Cow::Owned(code.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for LanguageCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for LanguageCode {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for LanguageCode {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl PartialEq<str> for LanguageCode {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for LanguageCode {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

/// A locale the user can pick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleInfo {
    pub code: LanguageCode,
    /// The name of the locale, in the locale itself.
    pub display_name: Cow<'static, str>,
}

/// The locales shipped with the client, in display order.
pub fn available_locales() -> Vec<LocaleInfo> {
    vec![
        LocaleInfo {
            code: LanguageCode::ZH_CN,
            display_name: Cow::Borrowed("简体中文"),
        },
        LocaleInfo {
            code: LanguageCode::EN_US,
            display_name: Cow::Borrowed("English"),
        },
        LocaleInfo {
            code: LanguageCode::ZH_TW,
            display_name: Cow::Borrowed("繁體中文"),
        },
    ]
}

/// The state owned by a [`LocaleController`](crate::LocaleController).
///
/// `active` is always either one of `available` or `fallback`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleState {
    pub active: LanguageCode,
    pub fallback: LanguageCode,
    pub available: Vec<LocaleInfo>,
}

impl LocaleState {
    /// `true` if `code` is one of the available locales.
    pub fn is_available(&self, code: &str) -> bool {
        self.available.iter().any(|l| l.code == code)
    }
}

impl Default for LocaleState {
    fn default() -> Self {
        Self {
            active: LanguageCode::ZH_CN,
            fallback: LanguageCode::ZH_CN,
            available: available_locales(),
        }
    }
}

/// Map the language reported by the host environment (a browser's
/// `navigator.language`, a POSIX `LANG`, ...) onto one of the available locales.
///
/// Chinese variants mentioning Taiwan or Hong Kong map to `zh-TW`, every other
/// Chinese variant to `zh-CN`. Everything else is served in `en-US`.
pub fn resolve_host_language(reported: &str) -> LanguageCode {
    let lang = reported.to_lowercase();
    if lang.contains("zh") {
        if lang.contains("tw") || lang.contains("hk") {
            return LanguageCode::ZH_TW;
        }
        return LanguageCode::ZH_CN;
    }
    LanguageCode::EN_US
}
