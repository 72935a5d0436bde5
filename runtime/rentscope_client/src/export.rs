use std::sync::LazyLock;

use bytes::Bytes;
use camino::{Utf8Path, Utf8PathBuf};
use regex::Regex;
use reqwest::header::{CONTENT_DISPOSITION, HeaderMap};

/// The name used when the backend doesn't suggest one.
pub const DEFAULT_EXPORT_FILENAME: &str = "houses.csv";

/// The media type of exported files.
pub const EXPORT_CONTENT_TYPE: &str = "text/csv;charset=utf-8";

static FILENAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"filename="?([^"]+)"?"#).expect("The filename pattern is a valid regex")
});

/// The file name suggested by a `Content-Disposition` header, if any.
///
/// Quotes around the file name are optional.
/// A missing or malformed header is not an error: it yields [`DEFAULT_EXPORT_FILENAME`].
pub fn suggested_filename(headers: &HeaderMap) -> String {
    headers
        .get(CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| FILENAME.captures(v))
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_owned())
        .unwrap_or_else(|| DEFAULT_EXPORT_FILENAME.to_owned())
}

/// The outcome of a bulk export.
#[derive(Debug, Clone)]
pub struct ExportedFile {
    /// The file name suggested by the backend.
    pub filename: String,
    pub download: DownloadHandle,
}

impl ExportedFile {
    /// Write the file into `dir`, under its suggested name.
    ///
    /// The name is sanitized first: path separators and reserved names can't be
    /// used to escape `dir`.
    pub async fn save_into(&self, dir: &Utf8Path) -> Result<Utf8PathBuf, errors::SaveError> {
        let mut name = sanitize_filename::sanitize(&self.filename);
        if name.is_empty() {
            name = DEFAULT_EXPORT_FILENAME.to_owned();
        }
        let path = dir.join(name);
        fs_err::tokio::create_dir_all(dir)
            .await
            .map_err(|e| errors::SaveError {
                path: path.clone(),
                source: e,
            })?;
        fs_err::tokio::write(&path, &self.download.bytes)
            .await
            .map_err(|e| errors::SaveError {
                path: path.clone(),
                source: e,
            })?;
        tracing::debug!(%path, bytes = self.download.len(), "Saved the exported file");
        Ok(path)
    }
}

/// An in-memory handle to a downloaded file.
///
/// Cloning is cheap: the content is reference-counted.
#[derive(Debug, Clone)]
pub struct DownloadHandle {
    bytes: Bytes,
}

impl DownloadHandle {
    pub fn new(bytes: Bytes) -> Self {
        Self { bytes }
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn content_type(&self) -> &'static str {
        EXPORT_CONTENT_TYPE
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

pub mod errors {
    use camino::Utf8PathBuf;

    #[derive(Debug, thiserror::Error)]
    #[error("Failed to save the exported file to `{path}`")]
    pub struct SaveError {
        pub path: Utf8PathBuf,
        #[source]
        pub source: std::io::Error,
    }
}
