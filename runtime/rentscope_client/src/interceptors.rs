//! The request/response pipeline of [`GatewayClient`](crate::GatewayClient).
//!
//! Each interceptor is a [`Middleware`]. They are registered in this order:
//!
//! 1. [`BaseHeaders`]
//! 2. [`BearerToken`]
//! 3. [`AcceptLanguage`]
//! 4. [`RoleHeader`]
//! 5. [`AuthExpiry`]
//!
//! Request-side work happens top to bottom, so later interceptors override
//! headers set by earlier ones. Header composition is over before the request
//! reaches the transport.
use std::sync::Arc;
use std::time::Duration;

use http::Extensions;
use reqwest::header::{ACCEPT_LANGUAGE, AUTHORIZATION, CONTENT_TYPE, HeaderName, HeaderValue};
use reqwest::{Request, Response, StatusCode};
use reqwest_middleware::{Middleware, Next};
use rentscope_i18n::LocaleController;
use rentscope_router::{Navigator, is_login_location, login_redirect, route_path};
use rentscope_session::Session;
use tracing_log_error::log_error;

/// The header carrying the role the request should be authorized with.
pub const X_USER_ROLE: HeaderName = HeaderName::from_static("x-user-role");

/// Requests whose path contains this segment are sent with the `admin` role.
pub const PURGE_PATH: &str = "/settings/purge";

/// Set `Content-Type: application/json` and the default timeout.
///
/// A timeout set on the request itself is preserved.
pub struct BaseHeaders {
    pub timeout: Duration,
}

#[async_trait::async_trait]
impl Middleware for BaseHeaders {
    async fn handle(
        &self,
        mut req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> Result<Response, reqwest_middleware::Error> {
        req.headers_mut()
            .entry(CONTENT_TYPE)
            .or_insert(HeaderValue::from_static("application/json"));
        if req.timeout().is_none() {
            *req.timeout_mut() = Some(self.timeout);
        }
        next.run(req, extensions).await
    }
}

/// Attach the session token as a bearer credential, if there is one.
pub struct BearerToken {
    pub session: Session,
}

#[async_trait::async_trait]
impl Middleware for BearerToken {
    async fn handle(
        &self,
        mut req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> Result<Response, reqwest_middleware::Error> {
        let token = self
            .session
            .token()
            .await
            .map_err(reqwest_middleware::Error::middleware)?;
        if let Some(token) = token {
            let mut value = HeaderValue::try_from(format!("Bearer {}", token.expose_secret()))
                .map_err(reqwest_middleware::Error::middleware)?;
            value.set_sensitive(true);
            req.headers_mut().insert(AUTHORIZATION, value);
        }
        next.run(req, extensions).await
    }
}

/// Advertise the active locale.
pub struct AcceptLanguage {
    pub locale: Arc<LocaleController>,
}

#[async_trait::async_trait]
impl Middleware for AcceptLanguage {
    async fn handle(
        &self,
        mut req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> Result<Response, reqwest_middleware::Error> {
        let active = self.locale.active();
        let value =
            HeaderValue::try_from(active.as_str()).map_err(reqwest_middleware::Error::middleware)?;
        req.headers_mut().insert(ACCEPT_LANGUAGE, value);
        next.run(req, extensions).await
    }
}

/// Set `X-User-Role`.
///
/// Purge requests are sent as `admin`; the session's role override, when set,
/// wins over that.
pub struct RoleHeader {
    pub session: Session,
}

#[async_trait::async_trait]
impl Middleware for RoleHeader {
    async fn handle(
        &self,
        mut req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> Result<Response, reqwest_middleware::Error> {
        if req.url().path().contains(PURGE_PATH) {
            req.headers_mut()
                .insert(X_USER_ROLE, HeaderValue::from_static("admin"));
        }
        let role_override = self
            .session
            .role_override()
            .await
            .map_err(reqwest_middleware::Error::middleware)?;
        if let Some(role) = role_override {
            let value =
                HeaderValue::try_from(role).map_err(reqwest_middleware::Error::middleware)?;
            req.headers_mut().insert(X_USER_ROLE, value);
        }
        next.run(req, extensions).await
    }
}

/// Tear down the session when the backend answers 401.
///
/// The session is cleared and, unless the user is already on the login page,
/// a single navigation to `/login?redirect=<current path>` is issued.
/// The redirect carries the path of the current location, without its query
/// string or fragment.
/// Both happen before the response is handed back to the caller.
pub struct AuthExpiry {
    pub session: Session,
    pub navigator: Arc<dyn Navigator>,
}

#[async_trait::async_trait]
impl Middleware for AuthExpiry {
    async fn handle(
        &self,
        req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> Result<Response, reqwest_middleware::Error> {
        let response = next.run(req, extensions).await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            tracing::info!(
                url = %response.url(),
                "The backend rejected our credentials, clearing the session"
            );
            if let Err(e) = self.session.logout().await {
                log_error!(e, "Failed to clear the session after a 401");
            }
            let current = self.navigator.current_path();
            if is_login_location(&current) {
                tracing::trace!("Already on the login page, not redirecting");
            } else {
                self.navigator.navigate(&login_redirect(route_path(&current)));
            }
        }
        Ok(response)
    }
}
