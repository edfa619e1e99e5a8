//! Reads API documents into a `Value` tree, from disk or over HTTP.
//!
//! Nothing here interprets the document; callers get the raw JSON and the
//! store/locator layers take it from there.

use std::path::Path;

use serde_json::Value;

use crate::error::EnrichError;

#[cfg(feature = "remote")]
use std::time::Duration;

/// Upper bound on a single document fetch. Documents are cached afterwards,
/// so a slow provider only hurts the first request per group.
#[cfg(feature = "remote")]
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Read and parse an API document from disk.
///
/// # Errors
///
/// `FileNotFound` for a missing path, `ReadError` for I/O failures, and
/// `InvalidJson` when the content does not parse.
pub fn load_document(path: &Path) -> Result<Value, EnrichError> {
    if !path.exists() {
        return Err(EnrichError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|source| EnrichError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&content).map_err(|source| EnrichError::InvalidJson { source })
}

/// Parse an API document held in memory.
pub fn load_document_str(content: &str) -> Result<Value, EnrichError> {
    serde_json::from_str(content).map_err(|source| EnrichError::InvalidJson { source })
}

/// Fetch an API document from an HTTP(S) endpoint. Gated behind the
/// default-on `remote` feature.
#[cfg(feature = "remote")]
pub fn load_document_url(url: &str) -> Result<Value, EnrichError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .map_err(|source| EnrichError::NetworkError {
            url: url.to_string(),
            source,
        })?;

    let response = client
        .get(url)
        .send()
        .map_err(|source| EnrichError::NetworkError {
            url: url.to_string(),
            source,
        })?;

    // Non-2xx statuses surface as network errors, not parse errors.
    let response = response
        .error_for_status()
        .map_err(|source| EnrichError::NetworkError {
            url: url.to_string(),
            source,
        })?;

    response
        .json()
        .map_err(|source| EnrichError::NetworkError {
            url: url.to_string(),
            source,
        })
}

/// True when the source string names an http(s) endpoint rather than a file.
pub fn is_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

/// Dispatch to URL or file loading based on the shape of `source`. Without
/// the `remote` feature a URL source reports as a missing file.
pub fn load_document_auto(source: &str) -> Result<Value, EnrichError> {
    if is_url(source) {
        #[cfg(feature = "remote")]
        {
            load_document_url(source)
        }
        #[cfg(not(feature = "remote"))]
        {
            Err(EnrichError::FileNotFound {
                path: std::path::PathBuf::from(source),
            })
        }
    } else {
        load_document(Path::new(source))
    }
}
