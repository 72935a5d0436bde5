use reqwest::StatusCode;
use serde_json::Value;

/// The error returned by every call issued through a
/// [`GatewayClient`](crate::GatewayClient).
///
/// Backend payloads are propagated verbatim: the client never reshapes them.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The request never produced a response: connection failure, timeout, etc.
    #[error("Failed to reach the backend")]
    Transport(#[source] reqwest::Error),
    /// The backend rejected the credentials (HTTP 401).
    ///
    /// By the time the caller sees this error the session has been cleared
    /// and, if needed, a navigation to the login page has been issued.
    #[error("The session is no longer valid")]
    AuthExpired { payload: Option<Value> },
    /// The backend returned an error with a payload.
    ///
    /// A JSON body is passed through as-is, any other body as a JSON string.
    #[error("The backend returned {status}")]
    Backend { status: StatusCode, payload: Value },
    /// The backend returned an error with an empty body.
    #[error("The backend returned {status}")]
    Status { status: StatusCode },
    /// An interceptor failed before the request could be dispatched.
    #[error("Failed to prepare the request")]
    Interceptor(#[source] anyhow::Error),
    /// The target URL could not be built.
    #[error("`{url}` is not a valid URL")]
    InvalidUrl {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// The query string or the body could not be encoded.
    #[error("Failed to encode the request")]
    Encode(#[source] serde_json::Error),
    /// The response body could not be read or decoded.
    #[error("Failed to decode the response")]
    Decode(#[source] anyhow::Error),
    /// The session could not be read or updated.
    #[error(transparent)]
    SessionLoad(#[from] rentscope_session::errors::LoadError),
    #[error(transparent)]
    SessionSave(#[from] rentscope_session::errors::SaveError),
}

impl GatewayError {
    /// The HTTP status returned by the backend, if there was a response.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            GatewayError::AuthExpired { .. } => Some(StatusCode::UNAUTHORIZED),
            GatewayError::Backend { status, .. } | GatewayError::Status { status } => {
                Some(*status)
            }
            _ => None,
        }
    }

    /// The error payload returned by the backend, if any.
    pub fn payload(&self) -> Option<&Value> {
        match self {
            GatewayError::AuthExpired { payload } => payload.as_ref(),
            GatewayError::Backend { payload, .. } => Some(payload),
            _ => None,
        }
    }

    /// The human-readable message in the backend payload, if there is one.
    ///
    /// The backend reports errors as `{"detail": "..."}`.
    pub fn detail(&self) -> Option<&str> {
        self.payload()?.get("detail")?.as_str()
    }

    pub(crate) fn from_middleware(e: reqwest_middleware::Error) -> Self {
        match e {
            reqwest_middleware::Error::Reqwest(e) => GatewayError::Transport(e),
            reqwest_middleware::Error::Middleware(e) => GatewayError::Interceptor(e),
        }
    }
}
