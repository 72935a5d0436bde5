use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "snake_case")]
/// Configure how [`GatewayClient`](crate::GatewayClient) reaches the backend.
///
/// All fields have sensible defaults, so an empty configuration is valid.
pub struct GatewayConfig {
    /// The origin the client is served from.
    ///
    /// It is used to resolve a relative `api_base_url`.
    #[serde(default = "default_origin")]
    pub origin: String,
    /// The base URL of the backend API.
    ///
    /// If it is absolute it is used as-is, otherwise it is appended to `origin`.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// The timeout applied to requests that don't set their own.
    #[serde(default = "default_request_timeout", with = "humantime_serde")]
    pub request_timeout: Duration,
    /// The timeout applied to image proxy requests.
    #[serde(default = "default_image_proxy_timeout", with = "humantime_serde")]
    pub image_proxy_timeout: Duration,
}

fn default_origin() -> String {
    "http://127.0.0.1:8000".to_owned()
}

fn default_api_base_url() -> String {
    "/api".to_owned()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(45)
}

fn default_image_proxy_timeout() -> Duration {
    Duration::from_secs(10)
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            origin: default_origin(),
            api_base_url: default_api_base_url(),
            request_timeout: default_request_timeout(),
            image_proxy_timeout: default_image_proxy_timeout(),
        }
    }
}

impl GatewayConfig {
    /// The URL every request path is appended to, without a trailing slash.
    pub fn base_url(&self) -> String {
        let base = if self.api_base_url.starts_with("http://")
            || self.api_base_url.starts_with("https://")
        {
            self.api_base_url.clone()
        } else {
            format!(
                "{}/{}",
                self.origin.trim_end_matches('/'),
                self.api_base_url.trim_start_matches('/')
            )
        };
        base.trim_end_matches('/').to_owned()
    }
}
