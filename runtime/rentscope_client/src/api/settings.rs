use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use crate::{GatewayClient, GatewayError, RequestOptions};

#[derive(Debug, Clone, Copy)]
pub struct Settings<'a> {
    pub(crate) client: &'a GatewayClient,
}

impl Settings<'_> {
    pub async fn get(&self) -> Result<Value, GatewayError> {
        self.client
            .send(Method::GET, "/settings", RequestOptions::new())
            .await
    }

    pub async fn update<B: Serialize + ?Sized>(
        &self,
        settings: &B,
    ) -> Result<Value, GatewayError> {
        let options = RequestOptions::new().json(settings)?;
        self.client.send(Method::PUT, "/settings", options).await
    }

    /// Backend version, database size and similar facts.
    pub async fn info(&self) -> Result<Value, GatewayError> {
        self.client
            .send(Method::GET, "/settings/info", RequestOptions::new())
            .await
    }

    /// Delete every crawled record.
    ///
    /// The request is sent with the `admin` role unless a role override is set.
    pub async fn purge(&self) -> Result<Value, GatewayError> {
        let options = RequestOptions::new().json(&serde_json::json!({}))?;
        self.client
            .send(Method::POST, "/settings/purge", options)
            .await
    }

    /// A JSON dump of the system settings.
    pub async fn export(&self) -> Result<Value, GatewayError> {
        self.client
            .send(Method::GET, "/settings/export", RequestOptions::new())
            .await
    }
}
