//! The transport half of a call: send, check status, decode.

use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{Error, Result};
use crate::request::Request;
use crate::wire::{Decoded, StringEncoded};

/// `User-Agent` sent unless [`Client::with_user_agent`] overrides it.
pub const DEFAULT_USER_AGENT: &str = concat!("discogen/", env!("CARGO_PKG_VERSION"));

/// Shared state of one generated API service.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
    data_wrapper: bool,
    user_agent: String,
}

impl Client {
    /// A client for the API rooted at `base_url`.
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            data_wrapper: false,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    /// Wrap JSON request bodies as `{"data": ...}`.
    pub fn with_data_wrapper(mut self, enabled: bool) -> Self {
        self.data_wrapper = enabled;
        self
    }

    /// Replace the `User-Agent` header value.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Point the service somewhere else, e.g. a test server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// URL every call path is resolved against.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send `req` and decode the JSON response into `T`.
    pub async fn execute_json<T: DeserializeOwned>(&self, req: Request) -> Result<T> {
        let res = self.send(req).await?;
        let bytes = res.bytes().await?;
        serde_json::from_slice(&bytes).map_err(Error::Decode)
    }

    /// Like [`Client::execute_json`] for responses whose integers are
    /// carried as JSON strings.
    pub async fn execute_wire<T: StringEncoded>(&self, req: Request) -> Result<T> {
        self.execute_json::<Decoded<T>>(req).await.map(|v| v.0)
    }

    /// Send `req` and discard the response body.
    pub async fn execute_empty(&self, req: Request) -> Result<()> {
        self.send(req).await?;
        Ok(())
    }

    async fn send(&self, req: Request) -> Result<reqwest::Response> {
        let prepared = req.prepare(&self.base_url, self.data_wrapper)?;
        debug!(
            method = %prepared.method,
            url = %prepared.url,
            body_len = prepared.content_length(),
            "Sending API request"
        );

        let mut builder = self
            .http
            .request(prepared.method, prepared.url.as_str())
            .header(USER_AGENT, &self.user_agent);
        if let Some(content_type) = prepared.content_type {
            builder = builder.header(CONTENT_TYPE, content_type);
        }
        if let Some(body) = prepared.body {
            builder = builder.body(body);
        }

        check_response(builder.send().await?).await
    }
}

/// Turn a non-2xx response into [`Error::Api`], reading `error.message`
/// from a JSON error body when there is one.
pub async fn check_response(res: reqwest::Response) -> Result<reqwest::Response> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let body = res.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.pointer("/error/message")?.as_str().map(str::to_string));
    debug!(status = status.as_u16(), "API request failed");
    Err(Error::Api {
        status: status.as_u16(),
        message,
        body,
    })
}
