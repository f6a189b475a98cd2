use probe_core::{ProbeConfig, ProbeError, ProbeResult};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, Url};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

use crate::exchange::{Exchange, RequestRecord, ResponseRecord};
use crate::resources::{AuthApi, Boards, Cards, Comments, Lists};

/// Thin wrapper over `reqwest` that records every call as an [`Exchange`].
///
/// The client never interprets status codes; callers decide what counts as
/// success for the step they are running.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> ProbeResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProbeError::Internal(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    pub fn from_config(config: &ProbeConfig) -> ProbeResult<Self> {
        Self::new(config.normalized_base_url(), config.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    pub fn clear_token(&mut self) {
        self.token = None;
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.set_token(token);
        self
    }

    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(self)
    }

    pub fn boards(&self) -> Boards<'_> {
        Boards::new(self)
    }

    pub fn lists(&self) -> Lists<'_> {
        Lists::new(self)
    }

    pub fn cards(&self) -> Cards<'_> {
        Cards::new(self)
    }

    pub fn comments(&self) -> Comments<'_> {
        Comments::new(self)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request_headers(&self) -> Vec<(String, String)> {
        let mut headers = vec![("Content-Type".to_string(), "application/json".to_string())];
        if let Some(token) = &self.token {
            headers.push(("Authorization".to_string(), format!("Bearer {}", token)));
        }
        headers
    }

    pub async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<Value>,
    ) -> ProbeResult<Exchange> {
        let url = if query.is_empty() {
            Url::parse(&self.url(path))
        } else {
            Url::parse_with_params(&self.url(path), query)
        }
        .map_err(|e| ProbeError::Config(format!("Invalid URL for {}: {}", path, e)))?;

        let headers = self.request_headers();
        let mut header_map = HeaderMap::new();
        for (name, value) in &headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ProbeError::Internal(e.to_string()))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| ProbeError::Config(format!("Invalid header value: {}", e)))?;
            header_map.insert(name, value);
        }

        let mut builder = self
            .http
            .request(method.clone(), url.clone())
            .headers(header_map);
        if let Some(body) = &body {
            builder = builder.json(body);
        }

        tracing::debug!(
            method = %method,
            url = %url,
            authenticated = self.token.is_some(),
            "sending request"
        );

        let response = builder.send().await.map_err(|e| {
            ProbeError::Connection(format!("{} {} failed: {}", method, url, e))
        })?;

        let status = response.status().as_u16();
        let response_headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.to_string(),
                    value.to_str().unwrap_or("<binary>").to_string(),
                )
            })
            .collect();
        let text = response.text().await.map_err(|e| {
            ProbeError::Connection(format!("Failed to read response body: {}", e))
        })?;

        tracing::debug!(status, bytes = text.len(), "received response");

        Ok(Exchange {
            request: RequestRecord {
                method: method.to_string(),
                url: url.to_string(),
                headers,
                body,
            },
            response: ResponseRecord::new(status, response_headers, text),
        })
    }

    pub async fn get(&self, path: &str, query: &[(&str, String)]) -> ProbeResult<Exchange> {
        self.send(Method::GET, path, query, None).await
    }

    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ProbeResult<Exchange> {
        self.send(Method::POST, path, &[], Some(to_body(body)?)).await
    }

    pub async fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ProbeResult<Exchange> {
        self.send(Method::PUT, path, &[], Some(to_body(body)?)).await
    }

    pub async fn delete(&self, path: &str) -> ProbeResult<Exchange> {
        self.send(Method::DELETE, path, &[], None).await
    }
}

pub(crate) fn to_body<B: Serialize + ?Sized>(body: &B) -> ProbeResult<Value> {
    serde_json::to_value(body).map_err(|e| ProbeError::Serialization(e.to_string()))
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("authenticated", &self.token.is_some())
            .finish()
    }
}
