//! Error types and the response classifier for the Intercom client.
//!
//! # Design
//! `IntercomError` is the single error type every public operation returns.
//! Application-level failures (non-2xx responses) are turned into an
//! `ApiError` by [`classify`], the only place that maps an HTTP status plus
//! the first `error.list` code onto an `ApiErrorKind`. Keeping the kinds in a
//! closed enum lets callers match exhaustively when deciding whether to retry.
//!
//! Transport failures never go through the classifier; they surface as
//! `IntercomError::Network`.

use std::fmt;

use thiserror::Error;

use crate::types::{ErrorDetail, ErrorList};

pub type Result<T> = std::result::Result<T, IntercomError>;

/// Errors returned by `IntercomClient`.
#[derive(Debug, Error)]
pub enum IntercomError {
    /// The client is not configured well enough to build a target URL.
    #[error(transparent)]
    Configuration(#[from] ConfigError),

    /// The caller passed malformed request parameters.
    #[error("{0}")]
    Argument(String),

    /// The transport could not complete the round-trip.
    #[error("network error: {0}")]
    Network(#[from] TransportError),

    /// The API answered with a non-2xx status.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The request parameters could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// A 2xx response body was not valid JSON.
    #[error("deserialization failed: {0}")]
    Deserialization(String),
}

impl IntercomError {
    /// Whether repeating the same call later may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            IntercomError::Network(err) => err.is_retryable(),
            IntercomError::Api(err) => err.is_retryable(),
            IntercomError::Configuration(_)
            | IntercomError::Argument(_)
            | IntercomError::Serialization(_)
            | IntercomError::Deserialization(_) => false,
        }
    }

    /// The classified API error, if this is one.
    pub fn as_api_error(&self) -> Option<&ApiError> {
        match self {
            IntercomError::Api(err) => Some(err),
            _ => None,
        }
    }
}

/// Invalid or incomplete client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error(
        "You must set both app_id and api_key to use this client. \
         See https://github.com/intercom/intercom-ruby for usage examples."
    )]
    MissingCredentials,

    #[error("invalid endpoint {0:?}: expected an http:// or https:// URL")]
    InvalidEndpoint(String),

    #[error("invalid protocol {0:?}: expected \"http\" or \"https\"")]
    InvalidProtocol(String),
}

/// Failure reported by a `Transport` before any HTTP status was received.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("invalid request URL: {0}")]
    InvalidUrl(String),
}

impl TransportError {
    /// A malformed URL fails the same way every time; timeouts and refused
    /// connections may not.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, TransportError::InvalidUrl(_))
    }
}

/// The closed set of classified API failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiErrorKind {
    BadRequest,
    Unauthorized,
    ResourceNotFound,
    MultipleMatchingUsers,
    RateLimitExceeded,
    ServerError,
    ServiceUnavailable,
    AuthenticationError,
    Generic,
}

impl ApiErrorKind {
    /// Kinds where the same request may succeed if sent again later.
    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            ApiErrorKind::RateLimitExceeded | ApiErrorKind::ServiceUnavailable
        )
    }
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ApiErrorKind::BadRequest => "bad request",
            ApiErrorKind::Unauthorized => "unauthorized",
            ApiErrorKind::ResourceNotFound => "resource not found",
            ApiErrorKind::MultipleMatchingUsers => "multiple matching users",
            ApiErrorKind::RateLimitExceeded => "rate limit exceeded",
            ApiErrorKind::ServerError => "server error",
            ApiErrorKind::ServiceUnavailable => "service unavailable",
            ApiErrorKind::AuthenticationError => "authentication error",
            ApiErrorKind::Generic => "http error",
        };
        f.write_str(name)
    }
}

/// A non-2xx response, classified.
///
/// `code` and `message` come from the first entry of the payload; `errors`
/// keeps the whole list in the order the API sent it. When the body was not an
/// `error.list`, `code` is `None`, `errors` is empty and `message` is the raw
/// body text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} (HTTP {status}): {message}")]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub status: u16,
    pub code: Option<String>,
    pub message: String,
    pub errors: Vec<ErrorDetail>,
}

impl ApiError {
    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}

/// Map an HTTP status and the first error code onto a kind.
pub fn kind_for(status: u16, code: Option<&str>) -> ApiErrorKind {
    match (status, code) {
        (400, Some("conflict" | "unique_user_constraint")) => ApiErrorKind::MultipleMatchingUsers,
        (400, _) => ApiErrorKind::BadRequest,
        (401, _) => ApiErrorKind::Unauthorized,
        (403, _) => ApiErrorKind::AuthenticationError,
        (404, _) => ApiErrorKind::ResourceNotFound,
        (429, _) => ApiErrorKind::RateLimitExceeded,
        (502 | 503, _) => ApiErrorKind::ServiceUnavailable,
        (500..=599, _) => ApiErrorKind::ServerError,
        _ => ApiErrorKind::Generic,
    }
}

/// Classify a non-2xx response body.
///
/// A body that does not decode as an `error.list` yields a `Generic` error
/// carrying the raw status and text, whatever the status was.
pub fn classify(status: u16, body: &str) -> ApiError {
    let payload = match serde_json::from_str::<ErrorList>(body) {
        Ok(payload) if payload.is_error_list() => payload,
        _ => {
            let message = if body.trim().is_empty() {
                format!("HTTP {status}")
            } else {
                body.to_string()
            };
            return ApiError {
                kind: ApiErrorKind::Generic,
                status,
                code: None,
                message,
                errors: Vec::new(),
            };
        }
    };

    let first = payload.errors.first();
    let code = first.map(|e| e.code.clone());
    let message = first
        .map(|e| e.message.clone())
        .unwrap_or_else(|| format!("HTTP {status}"));

    ApiError {
        kind: kind_for(status, code.as_deref()),
        status,
        code,
        message,
        errors: payload.errors,
    }
}
