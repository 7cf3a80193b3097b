//! HTTP transport implementation using `reqwest`.

use std::time::Duration;

use crate::{ApiRequest, ApiResponse, HttpTransport, Method, TransportError};

/// Default per-request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A `reqwest`-backed [`HttpTransport`] rooted at an API base URL.
///
/// Request paths are appended to the base URL verbatim, so a base of
/// `http://localhost:4000/api` and a path of `/ideas/` produce
/// `http://localhost:4000/api/ideas/`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: String,
}

impl ReqwestTransport {
    /// Creates a transport with the default timeout.
    pub fn new(base_url: &str) -> Result<Self, TransportError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Creates a transport whose requests time out after `timeout`.
    pub fn with_timeout(
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        reqwest::Url::parse(base_url).map_err(|e| {
            TransportError::InvalidRequest(format!("invalid base URL {base_url:?}: {e}"))
        })?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// The base URL every request path is appended to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url_for(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

impl HttpTransport for ReqwestTransport {
    async fn send(
        &self,
        request: ApiRequest,
    ) -> Result<ApiResponse, TransportError> {
        let url = self.url_for(&request.path);
        let mut builder = self
            .client
            .request(to_reqwest_method(request.method), &url);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_builder() {
                TransportError::InvalidRequest(e.to_string())
            } else {
                TransportError::Unreachable(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Body(e.to_string()))?;

        tracing::trace!(%url, status, bytes = body.len(), "response received");

        Ok(ApiResponse {
            status,
            body: body.to_vec(),
        })
    }
}
