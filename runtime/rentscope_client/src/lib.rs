//! The HTTP gateway client of the Rentscope client runtime.
//!
//! [`GatewayClient`] is the single chokepoint through which the client talks to
//! the backend. On the way out, every request is decorated with headers derived
//! from the session and the active locale. On the way back, a 401 tears the
//! session down and sends the user to the login page before the caller sees
//! the error.
//!
//! There are no retries: every failure is reported to the caller exactly once,
//! as a [`GatewayError`].
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use rentscope_client::{GatewayClient, GatewayConfig};
//! use rentscope_i18n::{Catalog, HeadlessDocument, LocaleController, LocaleState};
//! use rentscope_router::InMemoryNavigator;
//! use rentscope_storage::KeyValueStore;
//! use rentscope_storage_memory::InMemoryKeyValueStore;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let store = KeyValueStore::new(InMemoryKeyValueStore::new());
//! let locale = Arc::new(LocaleController::with_state(
//!     store.clone(),
//!     Arc::new(HeadlessDocument::new()),
//!     Catalog::bundled()?,
//!     LocaleState::default(),
//! ));
//! let client = GatewayClient::builder(
//!     GatewayConfig::default(),
//!     store,
//!     locale,
//!     Arc::new(InMemoryNavigator::default()),
//! )
//! .build();
//!
//! let cities = client.catalog().cities().await?;
//! println!("{cities}");
//! # Ok(())
//! # }
//! ```
pub mod api;
mod client;
mod config;
mod error;
mod export;
pub mod interceptors;

pub use client::{GatewayClient, GatewayClientBuilder, RawResponse, RequestOptions};
pub use config::GatewayConfig;
pub use error::GatewayError;
pub use export::{
    DEFAULT_EXPORT_FILENAME, DownloadHandle, EXPORT_CONTENT_TYPE, ExportedFile, suggested_filename,
};

pub mod errors {
    //! Errors that can occur outside of a backend call.
    pub use crate::export::errors::*;
}
