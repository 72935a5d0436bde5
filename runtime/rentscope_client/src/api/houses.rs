use std::fmt::Display;

use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use crate::{GatewayClient, GatewayError, RequestOptions};

#[derive(Debug, Clone, Copy)]
pub struct Houses<'a> {
    pub(crate) client: &'a GatewayClient,
}

impl Houses<'_> {
    pub async fn list<P: Serialize + ?Sized>(&self, params: &P) -> Result<Value, GatewayError> {
        let options = RequestOptions::new().query(params)?;
        self.client.send(Method::GET, "/houses", options).await
    }

    pub async fn count<P: Serialize + ?Sized>(&self, params: &P) -> Result<Value, GatewayError> {
        let options = RequestOptions::new().query(params)?;
        self.client.send(Method::GET, "/houses/count", options).await
    }

    pub async fn get(&self, house_id: impl Display) -> Result<Value, GatewayError> {
        self.client
            .send(
                Method::GET,
                &format!("/houses/{house_id}"),
                RequestOptions::new(),
            )
            .await
    }
}
