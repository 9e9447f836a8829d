//! Wire DTOs for the Intercom error payload.
//!
//! # Design
//! Every non-2xx response from the API carries an `error.list` document. Only
//! the envelope is modelled here; success payloads stay opaque
//! `serde_json::Value`s so resource-specific code can decode them however it
//! likes.

use serde::{Deserialize, Serialize};

/// The `type` tag every error payload carries.
pub const ERROR_LIST_TYPE: &str = "error.list";

/// `{"type": "error.list", "errors": [...]}` as sent by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorList {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub errors: Vec<ErrorDetail>,
}

impl ErrorList {
    pub fn is_error_list(&self) -> bool {
        self.kind == ERROR_LIST_TYPE
    }
}

/// One entry of an `error.list` payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorDetail {
    pub code: String,
    #[serde(default)]
    pub message: String,
    /// Name of the offending request field, when the API reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}
