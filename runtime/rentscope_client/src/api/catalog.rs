use reqwest::Method;
use serde_json::Value;

use crate::{GatewayClient, GatewayError, RequestOptions};

#[derive(Debug, Clone, Copy)]
pub struct Catalog<'a> {
    pub(crate) client: &'a GatewayClient,
}

impl Catalog<'_> {
    pub async fn cities(&self) -> Result<Value, GatewayError> {
        self.client
            .send(Method::GET, "/cities", RequestOptions::new())
            .await
    }

    pub async fn districts(&self, city: &str) -> Result<Value, GatewayError> {
        self.client
            .send(Method::GET, "/districts", RequestOptions::new().param("city", city))
            .await
    }

    pub async fn summary_statistics(&self, city: &str) -> Result<Value, GatewayError> {
        self.client
            .send(
                Method::GET,
                "/statistics/summary",
                RequestOptions::new().param("city", city),
            )
            .await
    }

    /// The figures shown on the home page.
    pub async fn dashboard(&self) -> Result<Value, GatewayError> {
        self.client
            .send(Method::GET, "/dashboard", RequestOptions::new())
            .await
    }
}
