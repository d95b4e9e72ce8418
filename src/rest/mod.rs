use crate::error::DataError;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

pub mod sign;

/// `User-Agent` sent with every REST request.
pub const USER_AGENT_VALUE: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/56.0.2924.87 Safari/537.36";

/// Fixed per-request timeout applied to all REST calls.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Thin wrapper around a [`reqwest::Client`] bound to one base URL.
///
/// Every call is a single synchronous-style GET: build the URL, attach the
/// static headers, send, fail on non-2xx, decode the body. No retry, no
/// backoff, no shared mutable state.
#[derive(Debug, Clone)]
pub struct RestClient {
    http: reqwest::Client,
    base_url: String,
}

impl RestClient {
    /// Construct a client for `base_url` with the fixed headers and timeout.
    pub fn new(base_url: &str) -> Result<Self, DataError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        let base_url = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };

        Ok(Self { http, base_url })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Issue a GET for `path` with the given query parameters and decode the
    /// 2xx response body.
    pub async fn get<T>(&self, path: &str, query: &[(&str, String)]) -> Result<T, DataError>
    where
        T: DeserializeOwned,
    {
        let url = self.url(path);
        debug!(%url, "sending GET request");

        let mut request = self.http.get(&url);
        if !query.is_empty() {
            request = request.query(query);
        }

        let response = request.send().await?;
        Self::decode(response).await
    }

    /// Issue a GET with a pre-encoded raw query string (used for signed
    /// requests, where the encoding order is part of the signature) and
    /// additional per-request headers.
    pub async fn get_raw_query<T>(
        &self,
        path: &str,
        raw_query: &str,
        headers: &[(&str, &str)],
    ) -> Result<T, DataError>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}?{}", self.url(path), raw_query);
        debug!(path, "sending signed GET request");

        let mut request = self.http.get(&url);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let response = request.send().await?;
        Self::decode(response).await
    }

    async fn decode<T>(response: reqwest::Response) -> Result<T, DataError>
    where
        T: DeserializeOwned,
    {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(DataError::RequestFailed { status, body });
        }

        serde_json::from_str(&body).map_err(|e| DataError::Decode(e.to_string()))
    }
}
