// src/fetch/error.rs
// =============================================================================
// Failure taxonomy for HTTP requests.
//
// Every reqwest error is folded into one of three buckets:
// - Timeout: the server didn't answer in time
// - ConnectionOrHttp: DNS, TLS, refused connections, redirect loops,
//   error status codes, bad URLs
// - Unexpected: anything else (undecodable bodies, client setup failures)
//
// The analyzer turns these into the message stored in the report; link
// probes record them inline as broken-link rows instead.
// =============================================================================

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,

    #[error("{0}")]
    ConnectionOrHttp(String),

    #[error("{0}")]
    Unexpected(String),
}

impl FetchError {
    // The message shown to the user when the page itself couldn't be fetched
    pub fn user_message(&self) -> String {
        match self {
            FetchError::Timeout => "Timed out while connecting to the site.".to_string(),
            FetchError::ConnectionOrHttp(detail) => format!("Connection or HTTP error: {}", detail),
            FetchError::Unexpected(detail) => format!("An unexpected error occurred: {}", detail),
        }
    }
}

// Categorizes reqwest errors the same way for page fetches and link probes.
//
// The order matters: a timeout while connecting reports both is_timeout()
// and is_connect(), and we want it to count as a timeout.
impl From<reqwest::Error> for FetchError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            FetchError::Timeout
        } else if error.is_decode() {
            FetchError::Unexpected(error.to_string())
        } else if error.is_connect()
            || error.is_status()
            || error.is_redirect()
            || error.is_request()
            || error.is_body()
            || error.is_builder()
        {
            FetchError::ConnectionOrHttp(error.to_string())
        } else {
            FetchError::Unexpected(error.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages() {
        assert_eq!(
            FetchError::Timeout.user_message(),
            "Timed out while connecting to the site."
        );
        assert_eq!(
            FetchError::ConnectionOrHttp("HTTP status client error (404 Not Found)".into())
                .user_message(),
            "Connection or HTTP error: HTTP status client error (404 Not Found)"
        );
        assert!(FetchError::Unexpected("boom".into())
            .user_message()
            .ends_with("boom"));
    }

    #[tokio::test]
    async fn test_builder_error_is_connection_or_http() {
        // reqwest refuses non-http schemes before any I/O happens
        let err = reqwest::Client::new()
            .get("ftp://example.com/file")
            .send()
            .await
            .unwrap_err();
        assert!(matches!(FetchError::from(err), FetchError::ConnectionOrHttp(_)));
    }
}
