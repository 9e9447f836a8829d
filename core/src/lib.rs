//! Client core for the Intercom REST API.
//!
//! # Overview
//! Holds an app id/key pair and a target configuration, resolves which base
//! URL each request goes to, builds requests with the credentials embedded,
//! and classifies non-2xx responses into a closed set of error kinds callers
//! can branch on (for example to decide whether a retry makes sense).
//!
//! # Design
//! - `IntercomClient` is an explicit value; several differently configured
//!   clients can live in one process.
//! - `EndpointResolver` rotates over a multi-entry endpoint pool every five
//!   minutes, with injectable clock and selector.
//! - Each call is split into `build_request` and `parse_response` around a
//!   pluggable [`Transport`]; `UreqTransport` is the default one.
//! - [`classify`] is the single mapping from status + `error.list` code to
//!   [`ApiErrorKind`].
//! - No retries happen here; `IntercomError::is_retryable` tells the caller
//!   which failures are worth repeating.

pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod http;
pub mod params;
#[cfg(feature = "ureq")]
pub mod transport;
pub mod types;

pub use client::IntercomClient;
pub use config::{ClientConfig, Protocol};
pub use endpoint::{
    Clock, EndpointResolver, EndpointSelector, FixedSelector, ManualClock, RandomSelector,
    RotationState, SystemClock, ROTATION_WINDOW,
};
pub use error::{classify, ApiError, ApiErrorKind, ConfigError, IntercomError, Result, TransportError};
pub use http::{ApiRequest, HttpMethod, HttpRequest, HttpResponse, Transport};
pub use params::check_required_params;
#[cfg(feature = "ureq")]
pub use transport::UreqTransport;
pub use types::{ErrorDetail, ErrorList};
