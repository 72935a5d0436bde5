use std::fmt::Display;

use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use crate::{GatewayClient, GatewayError, RequestOptions};

#[derive(Debug, Clone, Copy)]
pub struct ScheduledTasks<'a> {
    pub(crate) client: &'a GatewayClient,
}

impl ScheduledTasks<'_> {
    pub async fn create<B: Serialize + ?Sized>(&self, task: &B) -> Result<Value, GatewayError> {
        let options = RequestOptions::new().json(task)?;
        self.client
            .send(Method::POST, "/scheduled-tasks", options)
            .await
    }

    /// List scheduled tasks, `limit` at a time starting from `offset`.
    pub async fn list(&self, limit: u32, offset: u32) -> Result<Value, GatewayError> {
        let options = RequestOptions::new()
            .param("limit", limit)
            .param("offset", offset);
        self.client
            .send(Method::GET, "/scheduled-tasks", options)
            .await
    }

    pub async fn get(&self, id: impl Display) -> Result<Value, GatewayError> {
        self.client
            .send(
                Method::GET,
                &format!("/scheduled-tasks/{id}"),
                RequestOptions::new(),
            )
            .await
    }

    pub async fn update<B: Serialize + ?Sized>(
        &self,
        id: impl Display,
        task: &B,
    ) -> Result<Value, GatewayError> {
        let options = RequestOptions::new().json(task)?;
        self.client
            .send(Method::PUT, &format!("/scheduled-tasks/{id}"), options)
            .await
    }

    pub async fn delete(&self, id: impl Display) -> Result<Value, GatewayError> {
        self.client
            .send(
                Method::DELETE,
                &format!("/scheduled-tasks/{id}"),
                RequestOptions::new(),
            )
            .await
    }
}
