// src/fetch/client.rs
// =============================================================================
// The HTTP fetcher used by every part of an audit.
//
// Key functionality:
// - One reqwest Client per Fetcher, so connections are pooled and reused
//   across the page fetch and all of its link probes
// - A fixed, identifying user agent on every request
// - Two request modes:
//     fetch_page: GET with the long timeout, body read as text
//     probe:      GET with the short timeout, body never read
//
// Why GET for probes instead of HEAD?
// - Plenty of servers answer HEAD with 405 or 404 even when the page works
// - Dropping the response right after the headers arrive means we don't
//   download the body anyway
//
// Rust concepts:
// - Builder pattern: Client::builder() ... .build()
// - The ? operator with From: reqwest errors convert into FetchError
// - Clone on a handle type: copies share one connection pool
// =============================================================================

use reqwest::header::HeaderMap;
use reqwest::{redirect, Client};
use std::time::Duration;
use tracing::debug;

use super::FetchError;
use crate::config::{AuditConfig, MAX_REDIRECTS};

// A fully downloaded page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub status: u16,
    /// URL after following redirects
    pub final_url: String,
    pub headers: HeaderMap,
    pub body: String,
}

// Cloning a Fetcher is cheap: the clones share the same connection pool.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    page_timeout: Duration,
    probe_timeout: Duration,
}

impl Fetcher {
    pub fn new(config: &AuditConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .redirect(redirect::Policy::limited(MAX_REDIRECTS))
            .pool_idle_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| FetchError::Unexpected(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            page_timeout: config.page_timeout,
            probe_timeout: config.probe_timeout,
        })
    }

    // Fetches a page and returns its body.
    //
    // Error statuses (4xx/5xx) are failures here: there's nothing useful
    // to analyze on an error page.
    pub async fn fetch_page(&self, url: &str) -> Result<FetchedPage, FetchError> {
        debug!(url, timeout = ?self.page_timeout, "fetching page");

        let response = self
            .client
            .get(url)
            .timeout(self.page_timeout)
            .send()
            .await?
            .error_for_status()?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let headers = response.headers().clone();
        let body = response.text().await?;

        Ok(FetchedPage {
            status,
            final_url,
            headers,
            body,
        })
    }

    // Probes a link and returns its status code.
    //
    // The response is dropped as soon as we have the status line and
    // headers, so the body is never downloaded.
    pub async fn probe(&self, url: &str) -> Result<u16, FetchError> {
        let response = self
            .client
            .get(url)
            .timeout(self.probe_timeout)
            .send()
            .await?;

        let status = response.status().as_u16();
        drop(response);

        debug!(url, status, "probed link");
        Ok(status)
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. How does `?` turn a reqwest::Error into a FetchError?
//    - `?` calls From::from on the error before returning it
//    - error.rs implements From<reqwest::Error> for FetchError, so every
//      `?` here does the categorization for us
//
// 2. Why set the timeout per request instead of on the client?
//    - Page fetches and link probes share one client but need different
//      limits (10s vs 5s by default)
//    - RequestBuilder::timeout overrides the limit for just that request
//
// 3. What does error_for_status() do?
//    - reqwest treats a 404 or 500 as a successful response by default
//    - error_for_status() turns 4xx/5xx into an Err, which is what we want
//      for the page under analysis (but not for probes)
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config() -> AuditConfig {
        AuditConfig {
            page_timeout: Duration::from_millis(500),
            probe_timeout: Duration::from_millis(200),
            ..AuditConfig::default()
        }
    }

    #[tokio::test]
    async fn test_fetch_page_sends_user_agent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .and(header("user-agent", crate::config::DEFAULT_USER_AGENT))
            .respond_with(ResponseTemplate::new(200).set_body_string("<title>Hi</title>"))
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(&test_config()).unwrap();
        let page = fetcher.fetch_page(&server.uri()).await.unwrap();
        assert_eq!(page.status, 200);
        assert_eq!(page.body, "<title>Hi</title>");
    }

    #[tokio::test]
    async fn test_fetch_page_rejects_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(&test_config()).unwrap();
        let err = fetcher.fetch_page(&server.uri()).await.unwrap_err();
        assert!(matches!(err, FetchError::ConnectionOrHttp(_)));
    }

    #[tokio::test]
    async fn test_fetch_page_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(&test_config()).unwrap();
        let err = fetcher.fetch_page(&server.uri()).await.unwrap_err();
        assert_eq!(err, FetchError::Timeout);
    }

    #[tokio::test]
    async fn test_probe_returns_error_status_without_failing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(&test_config()).unwrap();
        let status = fetcher
            .probe(&format!("{}/missing", server.uri()))
            .await
            .unwrap();
        assert_eq!(status, 404);
    }

    #[tokio::test]
    async fn test_probe_connection_refused() {
        // Nothing listens on port 1
        let fetcher = Fetcher::new(&test_config()).unwrap();
        let err = fetcher.probe("http://127.0.0.1:1/").await.unwrap_err();
        assert!(matches!(err, FetchError::ConnectionOrHttp(_) | FetchError::Timeout));
    }
}
