use crate::wire::WireType;
use thiserror::Error;

/// Failures of the binary wire decoder.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("unexpected end of buffer")]
    UnexpectedEof,
    #[error("varint overflows 64 bits")]
    Overflow,
    #[error("invalid field key {0:#x}")]
    InvalidKey(u64),
    #[error("unsupported wire type {0}")]
    UnsupportedWireType(u8),
    #[error("field {field} of {message} expects {expected:?}, found {actual:?}")]
    WireTypeMismatch {
        message: &'static str,
        field: u32,
        expected: WireType,
        actual: WireType,
    },
    #[error("field {field} of {message} is not valid UTF-8")]
    InvalidUtf8 { message: &'static str, field: u32 },
}

/// Everything a single backend fetch can fail with.
///
/// The `Display` output is what ends up in the error slots of
/// [`ScannerSnapshot`](crate::state::ScannerSnapshot), so keep it readable.
#[derive(Debug, Error)]
pub enum Error {
    /// Non-2xx response.
    #[error("{endpoint} returned {status}{}", suffix(.detail))]
    HttpStatus {
        endpoint: String,
        status: reqwest::StatusCode,
        detail: Option<String>,
    },

    /// The request never produced a response (connection refused, timeout, ...).
    #[error("request to {endpoint} failed: {source}")]
    Network {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("malformed {message} payload: {source}")]
    Decode {
        message: &'static str,
        #[source]
        source: DecodeError,
    },

    #[error("malformed JSON from {endpoint}: {source}")]
    Json {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("GraphQL error: {0}")]
    GraphQl(String),

    #[error("Stock {0} not found")]
    NotFound(String),

    #[error("symbol must not be empty")]
    InvalidSymbol,

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn network(endpoint: &str, source: reqwest::Error) -> Self {
        Self::Network {
            endpoint: endpoint.to_string(),
            source,
        }
    }

    pub(crate) fn json(endpoint: &str, source: serde_json::Error) -> Self {
        Self::Json {
            endpoint: endpoint.to_string(),
            source,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

fn suffix(detail: &Option<String>) -> String {
    detail.as_ref().map(|d| format!(": {d}")).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_message_includes_detail() {
        let err = Error::HttpStatus {
            endpoint: "http://127.0.0.1:8000/api/peg-stocks/".to_string(),
            status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            detail: None,
        };
        assert_eq!(
            err.to_string(),
            "http://127.0.0.1:8000/api/peg-stocks/ returned 500 Internal Server Error"
        );

        let err = Error::HttpStatus {
            endpoint: "x".to_string(),
            status: reqwest::StatusCode::BAD_REQUEST,
            detail: Some("symbol query parameter is required".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "x returned 400 Bad Request: symbol query parameter is required"
        );
    }

    #[test]
    fn not_found_message() {
        let err = Error::NotFound("ZZZ".to_string());
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Stock ZZZ not found");
    }

    #[test]
    fn decode_error_names_the_message() {
        let err = Error::Decode {
            message: "pegscanner.ping.PingResponse",
            source: DecodeError::UnexpectedEof,
        };
        assert_eq!(
            err.to_string(),
            "malformed pegscanner.ping.PingResponse payload: unexpected end of buffer"
        );
    }
}
