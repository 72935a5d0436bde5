use std::fmt::Display;

use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use crate::{GatewayClient, GatewayError, RequestOptions};

#[derive(Debug, Clone, Copy)]
pub struct Analysis<'a> {
    pub(crate) client: &'a GatewayClient,
}

impl Analysis<'_> {
    /// Ask the backend to run an analysis.
    pub async fn run<B: Serialize + ?Sized>(&self, request: &B) -> Result<Value, GatewayError> {
        let options = RequestOptions::new().json(request)?;
        self.client.send(Method::POST, "/analysis/run", options).await
    }

    pub async fn results<P: Serialize + ?Sized>(&self, params: &P) -> Result<Value, GatewayError> {
        let options = RequestOptions::new().query(params)?;
        self.client
            .send(Method::GET, "/analysis/results", options)
            .await
    }

    pub async fn result(&self, result_id: impl Display) -> Result<Value, GatewayError> {
        self.client
            .send(
                Method::GET,
                &format!("/analysis/results/{result_id}"),
                RequestOptions::new(),
            )
            .await
    }

    /// The kinds of analysis the backend supports.
    pub async fn types(&self) -> Result<Value, GatewayError> {
        self.client
            .send(Method::GET, "/analysis/types", RequestOptions::new())
            .await
    }
}
