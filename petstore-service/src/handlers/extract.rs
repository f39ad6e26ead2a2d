//! Request extractors
//!
//! [`JsonBody`] decodes the body as JSON whatever the `Content-Type` says.
//! [`QueryParams`] decodes the query string, keeping the first value of a
//! repeated key. Both turn every failure into a 400 with the `{"error": ...}`
//! shape used by the rest of the API.

use axum::{
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::Error;

/// JSON request body; malformed input is [`Error::Validation`]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| Error::Validation(rejection.body_text()))?;

        serde_json::from_slice(&bytes)
            .map(JsonBody)
            .map_err(|e| Error::Validation(e.to_string()))
    }
}

/// Query-string parameters; malformed input is [`Error::Validation`]
///
/// `?status=sold&status=pending` reads as `status=sold`.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryParams<T>(pub T);

impl<T, S> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Query(pairs) = Query::<Vec<(String, String)>>::try_from_uri(&parts.uri)
            .map_err(|rejection| Error::Validation(rejection.body_text()))?;

        let mut fields = Map::new();
        for (key, value) in pairs {
            fields.entry(key).or_insert(Value::String(value));
        }

        serde_json::from_value(Value::Object(fields))
            .map(QueryParams)
            .map_err(|e| Error::Validation(e.to_string()))
    }
}

/// Parse an integer path parameter
pub fn parse_id(raw: &str) -> Result<i64, Error> {
    raw.parse().map_err(|_| Error::invalid_id())
}
