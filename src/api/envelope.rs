//! JSON response envelope shared by every domain endpoint.
//!
//! Success: `{"conso": {...}}`. Failure: `{"conso": null, "err": "..."}`.
//! The HTTP status is 200 either way; callers read `err`.

use crate::neo4j::error::StoreResult;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Response carrying one payload under `key`, or an error string
#[derive(Debug)]
pub struct Envelope<T> {
    key: &'static str,
    payload: Option<T>,
    err: Option<String>,
}

impl<T> Envelope<T> {
    pub fn ok(key: &'static str, payload: T) -> Self {
        Self {
            key,
            payload: Some(payload),
            err: None,
        }
    }

    pub fn err(key: &'static str, message: impl Into<String>) -> Self {
        Self {
            key,
            payload: None,
            err: Some(message.into()),
        }
    }

    /// Flatten a store result into the envelope, logging failures
    pub fn from_result(key: &'static str, result: StoreResult<T>) -> Self {
        match result {
            Ok(payload) => Self::ok(key, payload),
            Err(e) => {
                tracing::warn!("Request for {} failed: {}", key, e);
                Self::err(key, e.to_string())
            }
        }
    }

    pub fn payload(&self) -> Option<&T> {
        self.payload.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.err.as_deref()
    }
}

impl<T: Serialize> Serialize for Envelope<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if self.err.is_some() { 2 } else { 1 };
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry(self.key, &self.payload)?;
        if let Some(err) = &self.err {
            map.serialize_entry("err", err)?;
        }
        map.end()
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}
