use redact::Secret;
use reqwest::Method;
use rentscope_session::User;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{GatewayClient, GatewayError, RequestOptions};

/// The credentials sent to `/auth/login`.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    #[serde(serialize_with = "redact::expose_secret")]
    pub password: Secret<String>,
}

/// Authentication endpoints.
///
/// The calls that start or end a session keep the local session in sync:
///
/// - a login or registration response carrying a `token` starts a new session
///   with the `user` returned alongside it;
/// - [`Auth::logout`] clears the session, whatever the backend answered;
/// - [`Auth::delete_account`] clears the session once the account is gone.
#[derive(Debug, Clone, Copy)]
pub struct Auth<'a> {
    pub(crate) client: &'a GatewayClient,
}

impl Auth<'_> {
    pub async fn login(&self, credentials: &Credentials) -> Result<Value, GatewayError> {
        let options = RequestOptions::new().json(credentials)?;
        let payload = self
            .client
            .send(Method::POST, "/auth/login", options)
            .await?;
        self.start_session(&payload).await?;
        Ok(payload)
    }

    pub async fn register<B: Serialize + ?Sized>(&self, user: &B) -> Result<Value, GatewayError> {
        let options = RequestOptions::new().json(user)?;
        let payload = self
            .client
            .send(Method::POST, "/auth/register", options)
            .await?;
        self.start_session(&payload).await?;
        Ok(payload)
    }

    pub async fn forgot_password<B: Serialize + ?Sized>(
        &self,
        request: &B,
    ) -> Result<Value, GatewayError> {
        let options = RequestOptions::new().json(request)?;
        self.client
            .send(Method::POST, "/auth/forgot-password", options)
            .await
    }

    pub async fn reset_password<B: Serialize + ?Sized>(
        &self,
        request: &B,
    ) -> Result<Value, GatewayError> {
        let options = RequestOptions::new().json(request)?;
        self.client
            .send(Method::POST, "/auth/reset-password", options)
            .await
    }

    /// Log out on the backend, then clear the local session.
    ///
    /// The local session is cleared even if the backend call fails.
    pub async fn logout(&self) -> Result<Value, GatewayError> {
        let outcome = self
            .client
            .send(Method::POST, "/auth/logout", RequestOptions::new())
            .await;
        self.client.session().logout().await?;
        outcome
    }

    pub async fn profile(&self) -> Result<Value, GatewayError> {
        self.client
            .send(Method::GET, "/auth/profile", RequestOptions::new())
            .await
    }

    /// Fetch the profile and replace the cached user with it.
    pub async fn sync_profile(&self) -> Result<User, GatewayError> {
        let user: User = self
            .client
            .send_as(Method::GET, "/auth/profile", RequestOptions::new())
            .await?;
        self.client.session().update_user(&user).await?;
        Ok(user)
    }

    pub async fn update_profile<B: Serialize + ?Sized>(
        &self,
        profile: &B,
    ) -> Result<Value, GatewayError> {
        let options = RequestOptions::new().json(profile)?;
        self.client
            .send(Method::PUT, "/auth/profile", options)
            .await
    }

    /// Upload a base64-encoded avatar image.
    pub async fn upload_avatar(&self, avatar_data: &str) -> Result<Value, GatewayError> {
        let options =
            RequestOptions::new().json(&serde_json::json!({ "avatar_data": avatar_data }))?;
        self.client
            .send(Method::POST, "/auth/avatar", options)
            .await
    }

    /// Delete the account of the current user and clear the local session.
    pub async fn delete_account(&self, password: &Secret<String>) -> Result<Value, GatewayError> {
        let options = RequestOptions::new().param("password", password.expose_secret());
        let payload = self
            .client
            .send(Method::DELETE, "/auth/account", options)
            .await?;
        self.client.session().logout().await?;
        Ok(payload)
    }

    /// Ask the backend whether the current token is still valid.
    pub async fn check(&self) -> Result<Value, GatewayError> {
        self.client
            .send(Method::GET, "/auth/check", RequestOptions::new())
            .await
    }

    /// The preferences of the current user.
    pub async fn settings(&self) -> Result<Value, GatewayError> {
        self.client
            .send(Method::GET, "/auth/settings", RequestOptions::new())
            .await
    }

    pub async fn update_settings<B: Serialize + ?Sized>(
        &self,
        settings: &B,
    ) -> Result<Value, GatewayError> {
        let options = RequestOptions::new().json(settings)?;
        self.client
            .send(Method::PUT, "/auth/settings", options)
            .await
    }

    async fn start_session(&self, payload: &Value) -> Result<(), GatewayError> {
        let Some(token) = payload
            .get("token")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
        else {
            return Ok(());
        };
        let user = match payload.get("user") {
            Some(user) => User::deserialize(user).map_err(|e| GatewayError::Decode(e.into()))?,
            None => User::default(),
        };
        self.client
            .session()
            .login(Secret::new(token.to_owned()), &user)
            .await?;
        Ok(())
    }
}
