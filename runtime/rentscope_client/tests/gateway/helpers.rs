use std::sync::{Arc, Mutex};
use std::time::Duration;

use http::Extensions;
use reqwest::header::HeaderMap;
use reqwest::{Method, Request, Response};
use reqwest_middleware::{Middleware, Next};
use rentscope_client::{GatewayClient, GatewayConfig};
use rentscope_i18n::{Catalog, HeadlessDocument, LocaleController, LocaleState};
use rentscope_router::InMemoryNavigator;
use rentscope_session::{Session, User};
use rentscope_storage::KeyValueStore;
use rentscope_storage_memory::InMemoryKeyValueStore;

/// A request, as it reached the transport.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
    pub timeout: Option<Duration>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(self.body.as_deref().unwrap_or_default()).unwrap()
    }
}

type Responder = dyn Fn(&RecordedRequest) -> http::Response<Vec<u8>> + Send + Sync;

/// A terminal middleware standing in for the backend.
///
/// It records every request and answers with the configured responder,
/// without ever touching the network.
#[derive(Clone)]
pub struct StubBackend {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    responder: Arc<Responder>,
}

impl StubBackend {
    pub fn new(
        responder: impl Fn(&RecordedRequest) -> http::Response<Vec<u8>> + Send + Sync + 'static,
    ) -> Self {
        Self {
            requests: Default::default(),
            responder: Arc::new(responder),
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> RecordedRequest {
        self.requests().pop().expect("No request reached the backend")
    }
}

#[async_trait::async_trait]
impl Middleware for StubBackend {
    async fn handle(
        &self,
        req: Request,
        _extensions: &mut Extensions,
        _next: Next<'_>,
    ) -> Result<Response, reqwest_middleware::Error> {
        let recorded = RecordedRequest {
            method: req.method().clone(),
            path: req.url().path().to_owned(),
            query: req.url().query().map(ToOwned::to_owned),
            headers: req.headers().clone(),
            body: req.body().and_then(|b| b.as_bytes()).map(|b| b.to_vec()),
            timeout: req.timeout().copied(),
        };
        let response = (self.responder)(&recorded);
        self.requests.lock().unwrap().push(recorded);
        Ok(Response::from(response))
    }
}

/// A JSON response with the given status.
pub fn json_response(status: u16, body: serde_json::Value) -> http::Response<Vec<u8>> {
    http::Response::builder()
        .status(status)
        .header("content-type", "application/json")
        .body(serde_json::to_vec(&body).unwrap())
        .unwrap()
}

pub fn ok_json(body: serde_json::Value) -> http::Response<Vec<u8>> {
    json_response(200, body)
}

pub struct TestApp {
    pub client: GatewayClient,
    pub backend: StubBackend,
    pub store: KeyValueStore,
    pub session: Session,
    pub navigator: Arc<InMemoryNavigator>,
    pub locale: Arc<LocaleController>,
}

impl TestApp {
    /// A client whose backend answers every request with `responder`.
    /// The user starts on `/`.
    pub fn new(
        responder: impl Fn(&RecordedRequest) -> http::Response<Vec<u8>> + Send + Sync + 'static,
    ) -> Self {
        Self::at("/", responder)
    }

    /// Like [`TestApp::new`], but the user starts on `location`.
    pub fn at(
        location: &str,
        responder: impl Fn(&RecordedRequest) -> http::Response<Vec<u8>> + Send + Sync + 'static,
    ) -> Self {
        let store = KeyValueStore::new(InMemoryKeyValueStore::new());
        let locale = Arc::new(LocaleController::with_state(
            store.clone(),
            Arc::new(HeadlessDocument::new()),
            Catalog::bundled().unwrap(),
            LocaleState::default(),
        ));
        let navigator = Arc::new(InMemoryNavigator::new(location));
        let backend = StubBackend::new(responder);
        let client = GatewayClient::builder(
            GatewayConfig::default(),
            store.clone(),
            locale.clone(),
            navigator.clone(),
        )
        .with(backend.clone())
        .build();
        Self {
            client,
            backend,
            session: Session::new(store.clone()),
            store,
            navigator,
            locale,
        }
    }

    pub async fn log_in(&self, token: &str) {
        self.session
            .login(redact::Secret::new(token.to_owned()), &User::with_role("user"))
            .await
            .unwrap();
    }
}

/// Yield to the scheduler until `key` shows up in `store`.
pub async fn wait_for_key(store: &KeyValueStore, key: &str) -> String {
    for _ in 0..1_000 {
        if let Some(value) = store.get(key).await.unwrap() {
            return value;
        }
        tokio::task::yield_now().await;
    }
    panic!("`{key}` was never written");
}
