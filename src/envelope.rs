//! The `{status, message, data}` body every API response carries.
//!
//! `status` is a domain code of its own, independent of the HTTP status line
//! sent with it: successes carry [`STATUS_OK`] (200) and failures carry
//! [`STATUS_ERROR`] (144), whatever the HTTP code is. Clients match on these
//! exact values.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::error;

use crate::response::Response;
use crate::status::Status;
use crate::validation::ValidationErrors;

pub const STATUS_OK: i64 = 200;
pub const STATUS_ERROR: i64 = 144;

/// A response envelope. `data` is left out of the JSON when absent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T = Value> {
    pub status: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self { status: STATUS_OK, message: message.into(), data: Some(data) }
    }
}

impl Envelope {
    /// An error envelope whose message is the error's description.
    pub fn error(err: impl fmt::Display) -> Self {
        Self { status: STATUS_ERROR, message: err.to_string(), data: None }
    }

    /// An error envelope carrying the translated validation failures.
    pub fn validation(errors: &ValidationErrors) -> Self {
        Self::error(errors)
    }
}

/// Serializes `body` as the JSON payload of a response with HTTP `status`.
///
/// A serialization failure is not retried: it is logged and the client gets
/// a bare `500`.
pub fn write_json<T: Serialize>(status: Status, body: &T) -> Response {
    match serde_json::to_vec(body) {
        Ok(bytes) => Response::builder().status(status).json(bytes),
        Err(e) => {
            error!(error = %e, "failed to encode response body");
            Response::status(Status::InternalServerError)
        }
    }
}
