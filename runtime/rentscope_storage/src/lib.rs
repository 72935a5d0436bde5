/*!
The persistent key-value store used by the Rentscope client runtime.

# Why a port?

The session, the locale controller and the gateway client all need a small amount of
durable state: the authentication token, the cached user and the selected language.
In a browser that's local storage; in a CLI it's a file on disk; in a test suite it's a
hash map.

Instead of reaching for a concrete storage API, every component depends on
[`KeyValueStore`], a thin handle around your chosen [`KeyValueBackend`].

# Semantics

Keys and values are plain strings.
Every write is a single atomic key write: there are no cross-key transactions. Concurrent
writers may interleave, but a key's value is always whatever the last writer set.
*/
mod store_;

pub use store_::{KeyValueBackend, KeyValueStore};

pub mod errors {
    //! Errors that can occur when interacting with a key-value backend.
    pub use crate::store_::errors::*;
}

pub mod keys {
    //! The well-known keys written by the Rentscope client runtime.

    /// The bearer token of the current session.
    pub const TOKEN: &str = "token";
    /// The JSON-encoded user object cached at login time.
    pub const USER: &str = "user";
    /// A transient role override, attached to outgoing requests as `X-User-Role`.
    pub const ROLE_OVERRIDE: &str = "temp_admin_role";
    /// The language code selected by the user.
    pub const LANGUAGE: &str = "language";
    /// Unix time, in milliseconds, of the most recent crawl task submission.
    pub const LAST_CRAWL_TASK_START_TIME: &str = "lastCrawlTaskStartTime";
}
