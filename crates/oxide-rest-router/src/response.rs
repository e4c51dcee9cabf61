//! REST responses, error values and response normalization.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::{json, Map, Value};
use thiserror::Error;

/// A REST response carrying JSON data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: HashMap<String, String>,
    /// Response data.
    pub data: Value,
}

impl Response {
    /// Creates a 200 response with the given data.
    pub fn new(data: impl Into<Value>) -> Self {
        Self {
            status: 200,
            headers: HashMap::new(),
            data: data.into(),
        }
    }

    /// Creates an empty 200 response.
    #[must_use]
    pub fn ok() -> Self {
        Self::new(Value::Null)
    }

    /// Sets the status code.
    #[must_use]
    pub fn status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Sets a header.
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Adds every header from `headers`.
    #[must_use]
    pub fn headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Returns the status text for the current status code.
    #[must_use]
    pub const fn status_text(&self) -> &'static str {
        match self.status {
            200 => "OK",
            201 => "Created",
            204 => "No Content",
            400 => "Bad Request",
            401 => "Unauthorized",
            403 => "Forbidden",
            404 => "Not Found",
            405 => "Method Not Allowed",
            409 => "Conflict",
            422 => "Unprocessable Entity",
            500 => "Internal Server Error",
            _ => "Unknown",
        }
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::ok()
    }
}

/// An error value returned from handlers and permission checks.
///
/// `data` always carries the HTTP `status` the dispatcher should answer with.
#[derive(Debug, Clone, PartialEq, Serialize, Error)]
#[error("{code}: {message}")]
pub struct RestError {
    /// Machine readable error code.
    pub code: String,
    /// Human readable message.
    pub message: String,
    /// Extra data, including `status`.
    pub data: Map<String, Value>,
}

impl RestError {
    /// Creates an error answered with `status`.
    pub fn new(code: impl Into<String>, message: impl Into<String>, status: u16) -> Self {
        let mut data = Map::new();
        data.insert("status".to_string(), Value::from(status));
        Self {
            code: code.into(),
            message: message.into(),
            data,
        }
    }

    /// Merges extra data. The `status` entry is kept.
    #[must_use]
    pub fn with_data(mut self, data: Map<String, Value>) -> Self {
        let status = self.data.get("status").cloned();
        self.data.extend(data);
        if let Some(status) = status {
            self.data.insert("status".to_string(), status);
        }
        self
    }

    /// Returns the HTTP status, 500 when missing.
    #[must_use]
    pub fn status(&self) -> u16 {
        self.data
            .get("status")
            .and_then(Value::as_u64)
            .and_then(|status| u16::try_from(status).ok())
            .unwrap_or(500)
    }
}

impl From<RestError> for Response {
    fn from(error: RestError) -> Self {
        let status = error.status();
        Self::new(json!({
            "code": error.code,
            "message": error.message,
            "data": error.data,
        }))
        .status(status)
    }
}

/// Rejects a request with the default `401 Unauthorized` error.
#[must_use]
pub fn reject() -> RestError {
    RestError::new("unauthorized", "Unauthorized", 401)
}

/// Rejects a request with a custom error.
pub fn reject_with(
    code: impl Into<String>,
    message: impl Into<String>,
    status: u16,
    data: Map<String, Value>,
) -> RestError {
    RestError::new(code, message, status).with_data(data)
}

/// The outcome of a request callback.
pub type Outcome = std::result::Result<Response, RestError>;

/// Anything a handler may return.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// A complete response.
    Response(Response),
    /// An error value.
    Error(RestError),
    /// Plain data, answered with 200.
    Data(Value),
}

impl From<Response> for Reply {
    fn from(response: Response) -> Self {
        Self::Response(response)
    }
}

impl From<RestError> for Reply {
    fn from(error: RestError) -> Self {
        Self::Error(error)
    }
}

impl From<Value> for Reply {
    fn from(data: Value) -> Self {
        Self::Data(data)
    }
}

impl From<()> for Reply {
    fn from((): ()) -> Self {
        Self::Data(Value::Null)
    }
}

impl From<Outcome> for Reply {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Ok(response) => Self::Response(response),
            Err(error) => Self::Error(error),
        }
    }
}

/// Normalizes a handler return value into a response.
///
/// Errors pass through untouched so the dispatcher can answer with their
/// status.
pub fn ensure_response(reply: impl Into<Reply>) -> Outcome {
    match reply.into() {
        Reply::Response(response) => Ok(response),
        Reply::Error(error) => Err(error),
        Reply::Data(data) => Ok(Response::new(data)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reject_defaults() {
        let error = reject();
        assert_eq!(error.code, "unauthorized");
        assert_eq!(error.message, "Unauthorized");
        assert_eq!(error.status(), 401);
        assert_eq!(
            serde_json::to_value(&error).unwrap(),
            json!({"code": "unauthorized", "message": "Unauthorized", "data": {"status": 401}})
        );
    }

    #[test]
    fn test_reject_with_keeps_status() {
        let mut data = Map::new();
        data.insert("status".to_string(), json!(200));
        data.insert("field".to_string(), json!("secret"));

        let error = reject_with("invalid_param", "Invalid parameter", 400, data);
        assert_eq!(error.status(), 400);
        assert_eq!(error.data["field"], json!("secret"));
    }

    #[test]
    fn test_ensure_response() {
        let response = ensure_response(json!({"user_id": 1})).unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.data, json!({"user_id": 1}));

        let created = ensure_response(Response::new(json!([])).status(201)).unwrap();
        assert_eq!(created.status, 201);
        assert_eq!(created.status_text(), "Created");

        assert_eq!(ensure_response(reject()).unwrap_err(), reject());
    }

    #[test]
    fn test_error_into_response() {
        let response = Response::from(reject());
        assert_eq!(response.status, 401);
        assert_eq!(response.data["message"], json!("Unauthorized"));
    }
}
