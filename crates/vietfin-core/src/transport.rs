//! HTTP transport seam.
//!
//! Providers never touch `reqwest` directly; they ask a [`Transport`] for
//! decoded JSON or raw bytes. [`HttpTransport`] is the production implementation and
//! [`StaticTransport`] serves canned payloads for offline use and tests.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use std::fmt::Debug;
use std::sync::Mutex;
use std::time::Duration;
use tracing::debug;

use crate::error::{DataError, Result};

/// User agent sent by every provider unless overridden.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Request timeout of the default HTTP client.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetches decoded JSON documents.
#[async_trait]
pub trait Transport: Send + Sync + Debug {
    /// Issues a GET request and decodes the body as JSON.
    async fn get_json(&self, url: &str) -> Result<Value>;

    /// Issues a POST request with a JSON body and decodes the answer as JSON.
    async fn post_json(&self, url: &str, body: &Value) -> Result<Value>;

    /// Issues a url-encoded form POST with extra per-request headers and
    /// decodes the answer as JSON.
    async fn post_form(
        &self,
        url: &str,
        form: &[(&str, String)],
        headers: &[(&str, String)],
    ) -> Result<Value>;

    /// Issues a GET request and returns the undecoded body.
    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>>;
}

/// [`Transport`] backed by a `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    provider: &'static str,
}

impl HttpTransport {
    /// Builds a client sending `headers` on every request, with the default
    /// user agent and timeout.
    #[must_use]
    pub fn new(provider: &'static str, headers: &[(&'static str, &'static str)]) -> Self {
        let mut defaults = HeaderMap::new();
        for (name, value) in headers {
            if let (Ok(name), Ok(value)) = (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                defaults.insert(name, value);
            }
        }

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(defaults)
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self { client, provider }
    }

    /// Wraps an existing client.
    #[must_use]
    pub const fn with_client(provider: &'static str, client: reqwest::Client) -> Self {
        Self { client, provider }
    }

    fn check(&self, url: &str, response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(DataError::RateLimited {
                provider: self.provider.to_string(),
                retry_after: Some(Duration::from_secs(60)),
            });
        }

        if !status.is_success() {
            return Err(DataError::Http {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response)
    }

    async fn decode(&self, url: &str, response: reqwest::Response) -> Result<Value> {
        self.check(url, response)?
            .json::<Value>()
            .await
            .map_err(|e| DataError::Parse(format!("{url}: {e}")))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_json(&self, url: &str) -> Result<Value> {
        debug!(provider = self.provider, url, "GET");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DataError::Network(e.to_string()))?;

        self.decode(url, response).await
    }

    async fn post_json(&self, url: &str, body: &Value) -> Result<Value> {
        debug!(provider = self.provider, url, "POST");

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| DataError::Network(e.to_string()))?;

        self.decode(url, response).await
    }

    async fn post_form(
        &self,
        url: &str,
        form: &[(&str, String)],
        headers: &[(&str, String)],
    ) -> Result<Value> {
        debug!(provider = self.provider, url, "POST form");

        let mut request = self.client.post(url).form(form);
        for (name, value) in headers {
            request = request.header(*name, value.as_str());
        }

        let response = request
            .send()
            .await
            .map_err(|e| DataError::Network(e.to_string()))?;

        self.decode(url, response).await
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        debug!(provider = self.provider, url, "GET bytes");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DataError::Network(e.to_string()))?;

        let body = self
            .check(url, response)?
            .bytes()
            .await
            .map_err(|e| DataError::Network(format!("{url}: {e}")))?;
        Ok(body.to_vec())
    }
}

/// [`Transport`] serving canned JSON by URL pattern.
///
/// A request is answered by the longest registered pattern that occurs in its
/// URL, or by the fallback payload. Every requested URL is recorded, along
/// with the form fields and headers of form posts.
#[derive(Debug, Default)]
pub struct StaticTransport {
    routes: Vec<(String, Value)>,
    files: Vec<(String, Vec<u8>)>,
    fallback: Option<Value>,
    requests: Mutex<Vec<String>>,
    forms: Mutex<Vec<(String, String)>>,
    headers: Mutex<Vec<(String, String)>>,
}

impl StaticTransport {
    /// Creates a transport with no routes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers URLs containing `pattern` with `payload`.
    #[must_use]
    pub fn route(mut self, pattern: impl Into<String>, payload: Value) -> Self {
        self.routes.push((pattern.into(), payload));
        self
    }

    /// Answers byte downloads from URLs containing `pattern` with `body`.
    #[must_use]
    pub fn route_bytes(mut self, pattern: impl Into<String>, body: Vec<u8>) -> Self {
        self.files.push((pattern.into(), body));
        self
    }

    /// Answers every unmatched URL with `payload`.
    #[must_use]
    pub fn fallback(mut self, payload: Value) -> Self {
        self.fallback = Some(payload);
        self
    }

    /// URLs requested so far, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Form fields posted so far, in order.
    #[must_use]
    pub fn sent_forms(&self) -> Vec<(String, String)> {
        self.forms.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Per-request headers sent with form posts so far, in order.
    #[must_use]
    pub fn sent_headers(&self) -> Vec<(String, String)> {
        self.headers.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn record(&self, url: &str) {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(url.to_string());
    }

    fn answer(&self, url: &str) -> Result<Value> {
        self.record(url);

        self.routes
            .iter()
            .filter(|(pattern, _)| url.contains(pattern.as_str()))
            .max_by_key(|(pattern, _)| pattern.len())
            .map(|(_, payload)| payload.clone())
            .or_else(|| self.fallback.clone())
            .ok_or_else(|| not_found(url))
    }
}

fn not_found(url: &str) -> DataError {
    DataError::Http {
        status: 404,
        url: url.to_string(),
    }
}

fn owned(pairs: &[(&str, String)]) -> Vec<(String, String)> {
    pairs.iter().map(|(k, v)| ((*k).to_string(), v.clone())).collect()
}

#[async_trait]
impl Transport for StaticTransport {
    async fn get_json(&self, url: &str) -> Result<Value> {
        self.answer(url)
    }

    async fn post_json(&self, url: &str, _body: &Value) -> Result<Value> {
        self.answer(url)
    }

    async fn post_form(
        &self,
        url: &str,
        form: &[(&str, String)],
        headers: &[(&str, String)],
    ) -> Result<Value> {
        self.forms
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .extend(owned(form));
        self.headers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .extend(owned(headers));
        self.answer(url)
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        self.record(url);

        self.files
            .iter()
            .filter(|(pattern, _)| url.contains(pattern.as_str()))
            .max_by_key(|(pattern, _)| pattern.len())
            .map(|(_, body)| body.clone())
            .ok_or_else(|| not_found(url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_longest_pattern_wins() {
        let transport = StaticTransport::new()
            .route("tcbs.com.vn", json!({"which": "short"}))
            .route("tcbs.com.vn/tcanalysis", json!({"which": "long"}));

        let body = transport
            .get_json("https://apipubaws.tcbs.com.vn/tcanalysis/v1/ticker/VNM/overview")
            .await
            .unwrap();
        assert_eq!(body["which"], "long");
    }

    #[tokio::test]
    async fn test_unmatched_url_uses_fallback_or_fails() {
        let bare = StaticTransport::new();
        let err = bare.get_json("https://example.invalid/x").await.unwrap_err();
        assert!(matches!(err, DataError::Http { status: 404, .. }));

        let with_fallback = StaticTransport::new().fallback(json!([]));
        assert_eq!(with_fallback.get_json("https://x").await.unwrap(), json!([]));
    }

    #[tokio::test]
    async fn test_requests_recorded_in_order() {
        let transport = StaticTransport::new().fallback(json!({}));
        transport.get_json("https://a").await.unwrap();
        transport.post_json("https://b", &json!({})).await.unwrap();
        assert_eq!(transport.requests(), vec!["https://a", "https://b"]);
    }

    #[tokio::test]
    async fn test_form_post_records_fields_and_headers() {
        let transport = StaticTransport::new().route("/board", json!({"list": []}));
        let body = transport
            .post_form(
                "https://host/board",
                &[("stockCode", "VN30F2403".to_string())],
                &[("Cookie", "session=1".to_string())],
            )
            .await
            .unwrap();

        assert_eq!(body, json!({"list": []}));
        assert_eq!(
            transport.sent_forms(),
            vec![("stockCode".to_string(), "VN30F2403".to_string())]
        );
        assert_eq!(
            transport.sent_headers(),
            vec![("Cookie".to_string(), "session=1".to_string())]
        );
    }

    #[tokio::test]
    async fn test_byte_routes_are_separate_from_json_routes() {
        let transport = StaticTransport::new()
            .route("/download", json!({}))
            .route_bytes("/download", vec![1, 2, 3]);

        assert_eq!(transport.get_bytes("https://host/download?x=1").await.unwrap(), vec![1, 2, 3]);

        let err = transport.get_bytes("https://host/other").await.unwrap_err();
        assert!(matches!(err, DataError::Http { status: 404, .. }));
        assert_eq!(transport.requests().len(), 2);
    }
}
