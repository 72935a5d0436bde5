use std::sync::{Mutex, PoisonError};

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// The path of the login route.
pub const LOGIN_PATH: &str = "/login";

/// Characters escaped in a URI component: everything but `A-Z a-z 0-9 - _ . ! ~ * ' ( )`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// The login location that sends the user back to `full_path` afterwards.
///
/// ```rust
/// use rentscope_router::login_redirect;
///
/// assert_eq!(login_redirect("/task-list"), "/login?redirect=%2Ftask-list");
/// ```
pub fn login_redirect(full_path: &str) -> String {
    format!(
        "{LOGIN_PATH}?redirect={}",
        utf8_percent_encode(full_path, URI_COMPONENT)
    )
}

/// The path of `location`, without its query string and fragment.
///
/// ```rust
/// use rentscope_router::route_path;
///
/// assert_eq!(route_path("/house-list?city=bj#top"), "/house-list");
/// ```
pub fn route_path(location: &str) -> &str {
    let end = location.find(['?', '#']).unwrap_or(location.len());
    &location[..end]
}

/// `true` if `location` points at the login route, whatever its query string.
pub fn is_login_location(location: &str) -> bool {
    route_path(location) == LOGIN_PATH
}

/// The client-side history.
pub trait Navigator: Send + Sync + std::fmt::Debug {
    /// The full path (query string included) of the current location.
    fn current_path(&self) -> String;
    /// Move to `location`.
    fn navigate(&self, location: &str);
}

/// A [`Navigator`] that keeps its history in memory.
#[derive(Debug)]
pub struct InMemoryNavigator {
    history: Mutex<Vec<String>>,
}

impl InMemoryNavigator {
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            history: Mutex::new(vec![initial.into()]),
        }
    }

    /// Every location visited so far, the initial one included.
    pub fn history(&self) -> Vec<String> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The number of navigations since creation.
    pub fn navigations(&self) -> usize {
        self.history().len() - 1
    }
}

impl Default for InMemoryNavigator {
    fn default() -> Self {
        Self::new("/")
    }
}

impl Navigator for InMemoryNavigator {
    fn current_path(&self) -> String {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
            .unwrap_or_else(|| "/".to_owned())
    }

    fn navigate(&self, location: &str) {
        tracing::debug!(location, "Navigating");
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(location.to_owned());
    }
}
