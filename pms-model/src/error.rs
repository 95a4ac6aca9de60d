use std::error::Error as StdError;

use serde_json::Value;

use crate::descriptor::DescriptorError;
use crate::headers::HeaderError;

pub type BoxError = Box<dyn StdError + Send + Sync>;

/// Failures of a dispatched call.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A required parameter was absent; detected before any I/O.
    #[error("endpoint '{endpoint}' requires parameter '{parameter}'")]
    MissingParameter { endpoint: String, parameter: String },

    /// The transport failed (`status` is `None`) or the server answered with
    /// a non-2xx status (`status` is set, `payload` holds the parsed body).
    #[error("{}", request_failed_message(.status, .source))]
    RequestFailed {
        status: Option<u16>,
        payload: Option<Value>,
        #[source]
        source: Option<BoxError>,
    },

    #[error("no endpoint named '{0}'")]
    UnknownEndpoint(String),

    #[error("invalid header")]
    Header(#[from] HeaderError),

    #[error("could not build request for '{endpoint}'")]
    InvalidRequest {
        endpoint: String,
        #[source]
        source: BoxError,
    },

    #[error("invalid endpoint definition")]
    Descriptor(#[from] DescriptorError),
}

fn request_failed_message(status: &Option<u16>, source: &Option<BoxError>) -> String {
    match (status, source) {
        (Some(status), _) => format!("request failed with status {status}"),
        (None, Some(source)) => format!("request failed: {source}"),
        (None, None) => "request failed".to_string(),
    }
}

impl ApiError {
    pub fn transport(source: impl Into<BoxError>) -> Self {
        ApiError::RequestFailed {
            status: None,
            payload: None,
            source: Some(source.into()),
        }
    }

    pub fn status(status: u16, payload: Value) -> Self {
        ApiError::RequestFailed {
            status: Some(status),
            payload: Some(payload),
            source: None,
        }
    }

    /// HTTP status of a server-reported failure.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::RequestFailed { status, .. } => *status,
            _ => None,
        }
    }

    /// True for failures without any response from the server.
    pub fn is_transport_failure(&self) -> bool {
        matches!(self, ApiError::RequestFailed { status: None, .. })
    }
}

/// Failures of the client-side key/value persistence.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("stored value for '{key}' is corrupt")]
    PersistenceCorrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("storage I/O failed for '{key}'")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("could not serialize value for '{key}'")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_log::test;

    #[test]
    fn test_request_failed_kinds() {
        let e = ApiError::status(404, json!({"detail": "Not found."}));
        assert_eq!(e.status_code(), Some(404));
        assert!(!e.is_transport_failure());
        assert_eq!(e.to_string(), "request failed with status 404");

        let e = ApiError::transport(std::io::Error::other("connection refused"));
        assert_eq!(e.status_code(), None);
        assert!(e.is_transport_failure());
        assert_eq!(e.to_string(), "request failed: connection refused");
    }
}
