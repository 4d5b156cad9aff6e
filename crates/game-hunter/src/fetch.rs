//! Plain HTTP GET client wrapping reqwest.
//!
//! Not a browser. Applies the configured headers and timeout, follows
//! redirects, and reports every failure (network error, timeout, non-200
//! status) as `None`. There is no retry.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::debug;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
                                  AppleWebKit/537.36 (KHTML, like Gecko) \
                                  Chrome/131.0.0.0 Safari/537.36";

/// A successfully fetched page.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects.
    pub final_url: String,
    /// Response body as text.
    pub body: String,
}

/// HTTP client used by the source adapters.
#[derive(Clone)]
pub struct FetchClient {
    client: reqwest::Client,
    timeout: Duration,
}

impl FetchClient {
    /// Build a client with the given extra headers and per-request timeout.
    ///
    /// Header entries that are not valid HTTP header names or values are
    /// skipped with a debug log.
    pub fn new(headers: &BTreeMap<String, String>, timeout: Duration) -> Self {
        let mut default_headers = HeaderMap::new();
        for (name, value) in headers {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(n), Ok(v)) => {
                    default_headers.insert(n, v);
                }
                _ => debug!("skipping invalid header {name:?}"),
            }
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(DEFAULT_USER_AGENT)
            .default_headers(default_headers)
            .build()
            .unwrap_or_default();

        Self { client, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// GET a URL and return its body, or `None` on any failure.
    pub async fn get(&self, url: &str) -> Option<String> {
        self.get_page(url).await.map(|page| page.body)
    }

    /// GET a URL and return the body together with the post-redirect URL.
    pub async fn get_page(&self, url: &str) -> Option<FetchedPage> {
        let resp = match self.client.get(url).send().await {
            Ok(r) => r,
            Err(e) => {
                debug!("fetch {url} failed: {e}");
                return None;
            }
        };

        let status = resp.status().as_u16();
        if status != 200 {
            debug!("fetch {url} returned status {status}");
            return None;
        }

        let final_url = resp.url().to_string();
        match resp.text().await {
            Ok(body) => Some(FetchedPage {
                final_url,
                body,
            }),
            Err(e) => {
                debug!("reading body of {url} failed: {e}");
                None
            }
        }
    }
}

impl Default for FetchClient {
    fn default() -> Self {
        Self::new(&BTreeMap::new(), Duration::from_secs(8))
    }
}

/// Percent-encode a query value (`+` for spaces).
pub fn encode_query(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_encode_query() {
        assert_eq!(encode_query("Ratchet & Clank"), "Ratchet+%26+Clank");
        assert_eq!(encode_query("Half-Life 2"), "Half-Life+2");
    }

    #[tokio::test]
    async fn test_get_returns_body_on_200() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
            .mount(&server)
            .await;

        let client = FetchClient::default();
        let body = client.get(&format!("{}/page", server.uri())).await;
        assert_eq!(body.as_deref(), Some("<html>ok</html>"));
    }

    #[tokio::test]
    async fn test_get_returns_none_on_404() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = FetchClient::default();
        assert!(client.get(&format!("{}/missing", server.uri())).await.is_none());
    }

    #[tokio::test]
    async fn test_get_returns_none_on_connection_error() {
        let client = FetchClient::new(&BTreeMap::new(), Duration::from_millis(500));
        assert!(client.get("http://127.0.0.1:1/unreachable").await.is_none());
    }

    #[tokio::test]
    async fn test_configured_headers_are_sent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("accept-language", "en-US"))
            .respond_with(ResponseTemplate::new(200).set_body_string("hi"))
            .mount(&server)
            .await;

        let mut headers = BTreeMap::new();
        headers.insert("Accept-Language".to_string(), "en-US".to_string());
        let client = FetchClient::new(&headers, Duration::from_secs(5));
        let page = client.get_page(&server.uri()).await.unwrap();
        assert_eq!(page.body, "hi");
    }
}
