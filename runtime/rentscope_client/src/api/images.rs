use reqwest::Method;
use serde_json::Value;

use crate::{GatewayClient, GatewayError, RequestOptions};

#[derive(Debug, Clone, Copy)]
pub struct Images<'a> {
    pub(crate) client: &'a GatewayClient,
}

impl Images<'_> {
    /// Fetch a remote image through the backend, base64-encoded.
    ///
    /// These calls use the shorter image proxy timeout.
    pub async fn base64(&self, image_url: &str) -> Result<Value, GatewayError> {
        let options = RequestOptions::new()
            .param("url", image_url)
            .timeout(self.client.config().image_proxy_timeout);
        self.client.send(Method::GET, "/proxy/image", options).await
    }
}
