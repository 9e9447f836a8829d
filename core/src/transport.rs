//! Blocking [`Transport`] backed by `ureq`.
//!
//! Credentials embedded in the request URL are moved into an HTTP Basic
//! `authorization` header before the call goes out. 4xx/5xx responses come
//! back as data so the client can classify them.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use percent_encoding::percent_decode_str;

use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport};

#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl UreqTransport {
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Fail any call that takes longer than `timeout` overall.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::build(Some(timeout))
    }

    fn build(timeout: Option<Duration>) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(timeout)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let (url, authorization) = split_userinfo(&request.url)?;
        let mut headers = request.headers.clone();
        if let Some(value) = authorization {
            headers.push(("authorization".to_string(), value));
        }

        let result = match (request.method, request.body.as_deref()) {
            (HttpMethod::Get, _) => with_headers(self.agent.get(&url), &headers).call(),
            (HttpMethod::Delete, _) => with_headers(self.agent.delete(&url), &headers).call(),
            (HttpMethod::Post, Some(body)) => {
                with_headers(self.agent.post(&url), &headers).send(body.as_bytes())
            }
            (HttpMethod::Post, None) => with_headers(self.agent.post(&url), &headers).send_empty(),
            (HttpMethod::Put, Some(body)) => {
                with_headers(self.agent.put(&url), &headers).send(body.as_bytes())
            }
            (HttpMethod::Put, None) => with_headers(self.agent.put(&url), &headers).send_empty(),
        };
        let mut response = result.map_err(map_error)?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.body_mut().read_to_string().map_err(map_error)?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn with_headers<B>(mut builder: ureq::RequestBuilder<B>, headers: &[(String, String)]) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn map_error(err: ureq::Error) -> TransportError {
    match err {
        ureq::Error::Timeout(_) => TransportError::Timeout(err.to_string()),
        other => TransportError::Connection(other.to_string()),
    }
}

/// Strip `user:password@` from `raw` and return it as a Basic auth value.
fn split_userinfo(raw: &str) -> Result<(String, Option<String>), TransportError> {
    let mut url = url::Url::parse(raw).map_err(|e| TransportError::InvalidUrl(e.to_string()))?;
    if url.username().is_empty() && url.password().is_none() {
        return Ok((url.into(), None));
    }

    let username = decode_userinfo(url.username(), raw)?;
    let password = decode_userinfo(url.password().unwrap_or_default(), raw)?;
    let credentials = format!("{username}:{password}");
    let authorization = format!("Basic {}", STANDARD.encode(credentials));
    url.set_username("")
        .and_then(|()| url.set_password(None))
        .map_err(|()| TransportError::InvalidUrl(raw.to_string()))?;
    Ok((url.into(), Some(authorization)))
}

/// `Url` hands userinfo back percent-encoded; Basic auth wants the raw text.
fn decode_userinfo(encoded: &str, raw: &str) -> Result<String, TransportError> {
    percent_decode_str(encoded)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|_| TransportError::InvalidUrl(raw.to_string()))
}
