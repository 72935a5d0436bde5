use reqwest::Method;
use serde::Serialize;

use crate::export::{DownloadHandle, ExportedFile, suggested_filename};
use crate::{GatewayClient, GatewayError, RequestOptions};

#[derive(Debug, Clone, Copy)]
pub struct Export<'a> {
    pub(crate) client: &'a GatewayClient,
}

impl Export<'_> {
    /// Download the houses matching `params` as CSV.
    pub async fn houses<P: Serialize + ?Sized>(
        &self,
        params: &P,
    ) -> Result<ExportedFile, GatewayError> {
        let options = RequestOptions::new().query(params)?;
        let response = self
            .client
            .send_raw(Method::GET, "/export/houses", options)
            .await?;
        let filename = suggested_filename(&response.headers);
        tracing::debug!(%filename, bytes = response.body.len(), "Export completed");
        Ok(ExportedFile {
            filename,
            download: DownloadHandle::new(response.body),
        })
    }
}
