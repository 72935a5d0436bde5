use std::fmt::Display;

use reqwest::Method;
use rentscope_storage::keys;
use serde::Serialize;
use serde_json::Value;
use tracing_log_error::log_error;

use crate::{GatewayClient, GatewayError, RequestOptions};

#[derive(Debug, Clone, Copy)]
pub struct Tasks<'a> {
    pub(crate) client: &'a GatewayClient,
}

impl Tasks<'_> {
    /// Submit a crawl task.
    ///
    /// The submission time is recorded under `lastCrawlTaskStartTime`, whatever
    /// the outcome of the call.
    pub async fn create_crawl<B: Serialize + ?Sized>(
        &self,
        task: &B,
    ) -> Result<Value, GatewayError> {
        self.submit("/tasks/crawl", task).await
    }

    /// Submit a crawl task backed by a headless browser.
    ///
    /// The submission time is recorded like for [`Tasks::create_crawl`].
    pub async fn create_selenium_crawl<B: Serialize + ?Sized>(
        &self,
        task: &B,
    ) -> Result<Value, GatewayError> {
        self.submit("/tasks/selenium_crawl", task).await
    }

    async fn submit<B: Serialize + ?Sized>(
        &self,
        path: &str,
        task: &B,
    ) -> Result<Value, GatewayError> {
        self.record_start_time();
        let options = RequestOptions::new().json(task)?;
        self.client.send(Method::POST, path, options).await
    }

    /// Write the current time to the store in the background.
    fn record_start_time(&self) {
        let store = self.client.store().clone();
        let now = jiff::Timestamp::now().as_millisecond();
        tokio::spawn(async move {
            if let Err(e) = store
                .set(keys::LAST_CRAWL_TASK_START_TIME, &now.to_string())
                .await
            {
                log_error!(
                    e,
                    level: tracing::Level::WARN,
                    "Failed to record the crawl task start time"
                );
            }
        });
    }

    pub async fn list<P: Serialize + ?Sized>(&self, params: &P) -> Result<Value, GatewayError> {
        let options = RequestOptions::new().query(params)?;
        self.client.send(Method::GET, "/tasks", options).await
    }

    pub async fn count<P: Serialize + ?Sized>(&self, params: &P) -> Result<Value, GatewayError> {
        let options = RequestOptions::new().query(params)?;
        self.client.send(Method::GET, "/tasks/count", options).await
    }

    pub async fn get(&self, task_id: impl Display) -> Result<Value, GatewayError> {
        self.client
            .send(Method::GET, &format!("/tasks/{task_id}"), RequestOptions::new())
            .await
    }

    pub async fn delete(&self, task_id: impl Display) -> Result<Value, GatewayError> {
        self.client
            .send(Method::DELETE, &format!("/tasks/{task_id}"), RequestOptions::new())
            .await
    }
}
