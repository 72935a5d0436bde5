//! Typed accessors for the backend resources.
//!
//! Payloads are passed through as [`serde_json::Value`]: the client doesn't
//! model backend resources.
mod analysis;
mod auth;
mod catalog;
mod export;
mod houses;
mod images;
mod ip;
mod scheduled_tasks;
mod settings;
mod tasks;

pub use analysis::Analysis;
pub use auth::{Auth, Credentials};
pub use catalog::Catalog;
pub use export::Export;
pub use houses::Houses;
pub use images::Images;
pub use ip::Ip;
pub use scheduled_tasks::ScheduledTasks;
pub use settings::Settings;
pub use tasks::Tasks;

use crate::GatewayClient;

impl GatewayClient {
    /// Cities, districts and aggregate statistics.
    pub fn catalog(&self) -> Catalog<'_> {
        Catalog { client: self }
    }

    /// Crawl tasks.
    pub fn tasks(&self) -> Tasks<'_> {
        Tasks { client: self }
    }

    pub fn houses(&self) -> Houses<'_> {
        Houses { client: self }
    }

    pub fn analysis(&self) -> Analysis<'_> {
        Analysis { client: self }
    }

    /// Authentication and user profile.
    pub fn auth(&self) -> Auth<'_> {
        Auth { client: self }
    }

    /// System settings.
    pub fn settings(&self) -> Settings<'_> {
        Settings { client: self }
    }

    /// Bulk data export.
    pub fn export(&self) -> Export<'_> {
        Export { client: self }
    }

    pub fn scheduled_tasks(&self) -> ScheduledTasks<'_> {
        ScheduledTasks { client: self }
    }

    /// Outgoing IP and proxy pool management.
    pub fn ip(&self) -> Ip<'_> {
        Ip { client: self }
    }

    /// The image proxy.
    pub fn images(&self) -> Images<'_> {
        Images { client: self }
    }
}
