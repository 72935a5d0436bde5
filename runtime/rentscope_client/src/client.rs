use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware, Middleware};
use reqwest_tracing::TracingMiddleware;
use rentscope_i18n::LocaleController;
use rentscope_router::Navigator;
use rentscope_session::Session;
use rentscope_storage::KeyValueStore;
use serde::Serialize;
use serde_json::Value;

use crate::interceptors::{AcceptLanguage, AuthExpiry, BaseHeaders, BearerToken, RoleHeader};
use crate::{GatewayConfig, GatewayError};

/// The single chokepoint for backend calls.
///
/// Every request goes through the interceptor pipeline described in
/// [`interceptors`](crate::interceptors).
/// Cloning is cheap: clones share the same connection pool and state.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    http: ClientWithMiddleware,
    base_url: Arc<str>,
    config: Arc<GatewayConfig>,
    store: KeyValueStore,
    session: Session,
    locale: Arc<LocaleController>,
}

/// Assemble a [`GatewayClient`].
pub struct GatewayClientBuilder {
    config: GatewayConfig,
    store: KeyValueStore,
    locale: Arc<LocaleController>,
    navigator: Arc<dyn Navigator>,
    http: Option<reqwest::Client>,
    extra: Vec<Arc<dyn Middleware>>,
}

impl GatewayClientBuilder {
    /// Use a pre-configured `reqwest` client as the transport.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http = Some(client);
        self
    }

    /// Append a middleware right before the transport, after request tracing.
    pub fn with<M: Middleware>(mut self, middleware: M) -> Self {
        self.extra.push(Arc::new(middleware));
        self
    }

    pub fn build(self) -> GatewayClient {
        let session = Session::new(self.store.clone());
        let mut builder = ClientBuilder::new(self.http.unwrap_or_default())
            .with(BaseHeaders {
                timeout: self.config.request_timeout,
            })
            .with(BearerToken {
                session: session.clone(),
            })
            .with(AcceptLanguage {
                locale: self.locale.clone(),
            })
            .with(RoleHeader {
                session: session.clone(),
            })
            .with(AuthExpiry {
                session: session.clone(),
                navigator: self.navigator,
            })
            .with(TracingMiddleware::default());
        for middleware in self.extra {
            builder = builder.with_arc(middleware);
        }
        GatewayClient {
            http: builder.build(),
            base_url: self.config.base_url().into(),
            config: Arc::new(self.config),
            store: self.store,
            session,
            locale: self.locale,
        }
    }
}

/// Per-call options: query string, JSON body, timeout and extra headers.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    query: Vec<(String, String)>,
    body: Option<Value>,
    timeout: Option<Duration>,
    headers: HeaderMap,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a single query parameter.
    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Append every field of `params` to the query string.
    ///
    /// `params` must serialize to an object. Null fields are skipped, arrays
    /// become repeated keys, nested objects are sent as JSON.
    pub fn query<T: Serialize + ?Sized>(mut self, params: &T) -> Result<Self, GatewayError> {
        let params = serde_json::to_value(params).map_err(GatewayError::Encode)?;
        match params {
            Value::Object(fields) => {
                for (key, value) in fields {
                    push_query_value(&mut self.query, &key, value);
                }
            }
            Value::Null => {}
            other => {
                return Err(GatewayError::Encode(serde::ser::Error::custom(format!(
                    "query parameters must be an object, got `{other}`"
                ))));
            }
        }
        Ok(self)
    }

    /// Send `body` as JSON.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, GatewayError> {
        self.body = Some(serde_json::to_value(body).map_err(GatewayError::Encode)?);
        Ok(self)
    }

    /// Override the default timeout for this call.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// The query parameters, in insertion order.
    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }
}

fn push_query_value(query: &mut Vec<(String, String)>, key: &str, value: Value) {
    match value {
        Value::Null => {}
        Value::String(s) => query.push((key.to_owned(), s)),
        Value::Array(items) => {
            for item in items {
                push_query_value(query, key, item);
            }
        }
        other => query.push((key.to_owned(), other.to_string())),
    }
}

/// A successful response, before its body is interpreted.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl GatewayClient {
    pub fn builder(
        config: GatewayConfig,
        store: KeyValueStore,
        locale: Arc<LocaleController>,
        navigator: Arc<dyn Navigator>,
    ) -> GatewayClientBuilder {
        GatewayClientBuilder {
            config,
            store,
            locale,
            navigator,
            http: None,
            extra: Vec::new(),
        }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// The URL paths are appended to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn store(&self) -> &KeyValueStore {
        &self.store
    }

    pub fn locale(&self) -> &Arc<LocaleController> {
        &self.locale
    }

    /// Issue a request and return the JSON payload of the response.
    ///
    /// An empty body is returned as `null`, a body that isn't JSON as a string.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<Value, GatewayError> {
        let response = self.send_raw(method, path, options).await?;
        Ok(decode_payload(&response.body))
    }

    /// Issue a request and deserialize the JSON payload of the response.
    pub async fn send_as<T: serde::de::DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<T, GatewayError> {
        let payload = self.send(method, path, options).await?;
        serde_json::from_value(payload).map_err(|e| GatewayError::Decode(e.into()))
    }

    /// Issue a request and return the response as-is, if it was successful.
    #[tracing::instrument(
        name = "Gateway call",
        skip(self, options),
        level = tracing::Level::DEBUG
    )]
    pub async fn send_raw(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<RawResponse, GatewayError> {
        let url = format!("{}{}", self.base_url, path);
        let url = reqwest::Url::parse(&url).map_err(|e| GatewayError::InvalidUrl {
            url: url.clone(),
            source: e.into(),
        })?;

        let mut request = self.http.request(method, url).headers(options.headers);
        if !options.query.is_empty() {
            request = request.query(&options.query);
        }
        if let Some(body) = &options.body {
            request = request.json(body);
        }
        if let Some(timeout) = options.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(GatewayError::from_middleware)?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| GatewayError::Decode(e.into()))?;

        if status.is_success() {
            return Ok(RawResponse {
                status,
                headers,
                body,
            });
        }

        // A body that isn't JSON is kept as text. Only an empty body carries no payload.
        let payload = (!body.is_empty()).then(|| decode_payload(&body));
        tracing::debug!(%status, "The backend returned an error");
        Err(match (status, payload) {
            (StatusCode::UNAUTHORIZED, payload) => GatewayError::AuthExpired { payload },
            (status, Some(payload)) => GatewayError::Backend { status, payload },
            (status, None) => GatewayError::Status { status },
        })
    }
}

fn decode_payload(body: &[u8]) -> Value {
    if body.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(body)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned()))
}
