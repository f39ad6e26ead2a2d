//! Query-string parameters
//!
//! Multi-value filters arrive as one comma-separated parameter
//! (`?status=available,sold`); [`split_list`] turns them into trimmed tokens.

use serde::{Deserialize, Serialize};

/// Status searched when `findByStatus` is called without `status`
pub const DEFAULT_STATUS: &str = "available";

fn default_status() -> String {
    DEFAULT_STATUS.to_string()
}

/// Split a comma-separated parameter, trimming each token
///
/// Empty tokens are kept: `""` yields `[""]`.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',').map(|token| token.trim().to_string()).collect()
}

/// `GET /pet/findByStatus`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusQuery {
    /// Comma-separated statuses; absent means `available`
    #[serde(default = "default_status")]
    pub status: String,
}

impl StatusQuery {
    pub fn statuses(&self) -> Vec<String> {
        split_list(&self.status)
    }
}

/// `GET /pet/findByTags`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TagsQuery {
    #[serde(default)]
    pub tags: String,
}

impl TagsQuery {
    /// Requested tag names, or `None` when the first one is empty
    ///
    /// The emptiness check looks at the raw token: `" ,dog"` still searches.
    pub fn tags(&self) -> Option<Vec<String>> {
        match self.tags.split(',').next() {
            Some(first) if !first.is_empty() => Some(split_list(&self.tags)),
            _ => None,
        }
    }
}

/// `POST /pet/{petId}?name=&status=`; blank values leave the column alone
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PetFormQuery {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: String,
}

/// `GET /user/login`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginQuery {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse<T: serde::de::DeserializeOwned>(query: &str) -> T {
        let uri: axum::http::Uri = format!("http://localhost/?{query}").parse().unwrap();
        axum::extract::Query::<T>::try_from_uri(&uri).unwrap().0
    }

    #[test]
    fn test_split_list_trims_tokens() {
        assert_eq!(split_list("available, sold ,pending"), vec!["available", "sold", "pending"]);
        assert_eq!(split_list(""), vec![""]);
    }

    #[test]
    fn test_status_defaults_to_available() {
        let query: StatusQuery = parse("");
        assert_eq!(query.statuses(), vec!["available"]);

        let query: StatusQuery = parse("status=pending,sold");
        assert_eq!(query.statuses(), vec!["pending", "sold"]);

        let query: StatusQuery = parse("status=");
        assert_eq!(query.statuses(), vec![""]);
    }

    #[test]
    fn test_blank_tags_mean_no_filter() {
        assert_eq!(parse::<TagsQuery>("").tags(), None);
        assert_eq!(parse::<TagsQuery>("tags=").tags(), None);
        assert_eq!(parse::<TagsQuery>("tags=,dog").tags(), None);
        assert_eq!(
            parse::<TagsQuery>("tags=%20,dog").tags(),
            Some(vec![String::new(), "dog".to_string()])
        );
        assert_eq!(
            parse::<TagsQuery>("tags=dog,%20cat").tags(),
            Some(vec!["dog".to_string(), "cat".to_string()])
        );
    }

    #[test]
    fn test_login_query_fields_default_empty() {
        let query: LoginQuery = parse("username=bob");
        assert_eq!(query.username, "bob");
        assert_eq!(query.password, "");
    }
}
