use std::fmt::Display;

use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use crate::{GatewayClient, GatewayError, RequestOptions};

/// These endpoints live under `/api/ip`, relative to the API base URL.
#[derive(Debug, Clone, Copy)]
pub struct Ip<'a> {
    pub(crate) client: &'a GatewayClient,
}

impl Ip<'_> {
    /// The IP address crawlers are currently going out from.
    pub async fn current(&self) -> Result<Value, GatewayError> {
        self.client
            .send(Method::GET, "/api/ip/current", RequestOptions::new())
            .await
    }

    pub async fn refresh(&self) -> Result<Value, GatewayError> {
        self.client
            .send(Method::POST, "/api/ip/refresh", RequestOptions::new())
            .await
    }

    pub async fn proxies(&self) -> Result<Value, GatewayError> {
        self.client
            .send(Method::GET, "/api/ip/proxies", RequestOptions::new())
            .await
    }

    pub async fn add_proxy<B: Serialize + ?Sized>(
        &self,
        proxy: &B,
    ) -> Result<Value, GatewayError> {
        let options = RequestOptions::new().json(proxy)?;
        self.client
            .send(Method::POST, "/api/ip/proxies", options)
            .await
    }

    pub async fn delete_proxy(&self, proxy_id: impl Display) -> Result<Value, GatewayError> {
        self.client
            .send(
                Method::DELETE,
                &format!("/api/ip/proxies/{proxy_id}"),
                RequestOptions::new(),
            )
            .await
    }

    /// Ask the backend to check whether a proxy works.
    pub async fn test_proxy(&self, proxy_id: impl Display) -> Result<Value, GatewayError> {
        self.client
            .send(
                Method::POST,
                &format!("/api/ip/proxies/{proxy_id}/test"),
                RequestOptions::new(),
            )
            .await
    }

    pub async fn settings(&self) -> Result<Value, GatewayError> {
        self.client
            .send(Method::GET, "/api/ip/settings", RequestOptions::new())
            .await
    }

    pub async fn save_settings<B: Serialize + ?Sized>(
        &self,
        settings: &B,
    ) -> Result<Value, GatewayError> {
        let options = RequestOptions::new().json(settings)?;
        self.client
            .send(Method::POST, "/api/ip/settings", options)
            .await
    }
}
