//! Request identifiers
//!
//! Every request gets an `x-request-id` of the form `req_<base32 uuidv7>`
//! (the TypeID format), so ids sort by arrival time in the logs.

use http::{HeaderValue, Request};
use mti::prelude::*;
use std::fmt;
use std::str::FromStr;
use tower_http::request_id::{MakeRequestId, RequestId as TowerRequestId};

/// Time-sortable request identifier, e.g. `req_01h455vb4pex5vsknk084sn02q`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(MagicTypeId);

impl RequestId {
    pub const PREFIX: &'static str = "req";

    #[must_use]
    pub fn new() -> Self {
        Self(Self::PREFIX.create_type_id::<V7>())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RequestId {
    type Err = RequestIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = MagicTypeId::from_str(s)?;
        if id.prefix().as_str() != Self::PREFIX {
            return Err(RequestIdError::InvalidPrefix(id.prefix().as_str().to_string()));
        }
        Ok(Self(id))
    }
}

/// Error parsing a [`RequestId`]
#[derive(Debug, thiserror::Error)]
pub enum RequestIdError {
    #[error("failed to parse request ID: {0}")]
    Parse(#[from] MagicTypeIdError),

    #[error("invalid request ID prefix '{0}', expected 'req'")]
    InvalidPrefix(String),
}

/// Generates a [`RequestId`] for `tower_http::request_id::SetRequestIdLayer`
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeTypedRequestId;

impl MakeRequestId for MakeTypedRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<TowerRequestId> {
        let header_value = HeaderValue::from_str(RequestId::new().as_str()).ok()?;
        Some(TowerRequestId::new(header_value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_request_id_format() {
        let id = RequestId::new();
        assert!(id.as_str().starts_with("req_"));
        // prefix (3) + underscore (1) + suffix (26)
        assert_eq!(id.as_str().len(), 30);
        assert_eq!(id.to_string(), id.as_str());
    }

    #[test]
    fn test_parse_round_trips() {
        let id = RequestId::from_str("req_01h455vb4pex5vsknk084sn02q").unwrap();
        assert_eq!(id.as_str(), "req_01h455vb4pex5vsknk084sn02q");
    }

    #[test]
    fn test_parse_rejects_other_prefixes() {
        match RequestId::from_str("user_01h455vb4pex5vsknk084sn02q") {
            Err(RequestIdError::InvalidPrefix(prefix)) => assert_eq!(prefix, "user"),
            other => panic!("expected InvalidPrefix, got {other:?}"),
        }
        assert!(RequestId::from_str("req_invalid").is_err());
    }

    #[test]
    fn test_ids_are_time_ordered() {
        let first = RequestId::new();
        std::thread::sleep(std::time::Duration::from_millis(2));
        assert!(first < RequestId::new());
    }

    #[test]
    fn test_make_typed_request_id() {
        let request = Request::builder().body(()).unwrap();
        let id = MakeTypedRequestId.make_request_id(&request).unwrap();
        assert!(id.header_value().to_str().unwrap().starts_with("req_"));
    }
}
