//! Pet store entities and their JSON shapes
//!
//! Every field is optional on input: a missing field decodes to its zero
//! value, and so does an explicit `null`.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Decode `null` as the type's zero value
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Pet category; accepted on write but not persisted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Category {
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
}

/// Pet tag; accepted on write but not persisted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tag {
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
}

/// A pet in the store
///
/// Only `id`, `name` and `status` are persisted. `category`, `photo_urls` and
/// `tags` are echoed back by writes and come back empty on reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(default, rename_all = "camelCase")]
pub struct Pet {
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    #[sqlx(skip)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[sqlx(skip)]
    #[serde(deserialize_with = "null_as_default")]
    pub photo_urls: Vec<String>,
    #[sqlx(skip)]
    #[serde(deserialize_with = "null_as_default")]
    pub tags: Vec<Tag>,
    /// available, pending or sold by convention; not enforced
    #[serde(deserialize_with = "null_as_default")]
    pub status: String,
}

/// A purchase order for a pet
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Order {
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub pet_id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub quantity: i64,
    /// RFC 3339 with the client's offset; absent is stored as the empty
    /// string and written as [`ship_date::ZERO`]
    #[serde(with = "ship_date")]
    pub ship_date: Option<DateTime<FixedOffset>>,
    #[serde(deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(deserialize_with = "null_as_default")]
    pub complete: bool,
}

/// JSON form of [`Order::ship_date`]
pub mod ship_date {
    use chrono::{DateTime, FixedOffset, SecondsFormat};
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    /// Zero timestamp written when an order has no ship date
    pub const ZERO: &str = "0001-01-01T00:00:00Z";

    /// RFC 3339 text keeping the offset; UTC is written with `Z`
    pub fn format(date: &DateTime<FixedOffset>) -> String {
        date.to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }

    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<FixedOffset>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(date) => serializer.serialize_str(&format(date)),
            None => serializer.serialize_str(ZERO),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<FixedOffset>>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|text| DateTime::parse_from_rfc3339(&text).map_err(D::Error::custom))
            .transpose()
    }
}

/// A registered user
///
/// The password is stored and compared as plain text and is returned by
/// reads. This matches the existing wire contract; it is not a recommendation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(default, rename_all = "camelCase")]
pub struct User {
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub username: String,
    #[serde(deserialize_with = "null_as_default")]
    pub first_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub last_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(deserialize_with = "null_as_default")]
    pub password: String,
    #[serde(deserialize_with = "null_as_default")]
    pub phone: String,
    #[serde(deserialize_with = "null_as_default")]
    pub user_status: i64,
}

/// Pet counts keyed by status; statuses without pets are absent
pub type Inventory = BTreeMap<String, i64>;

/// Response of the image upload endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub filename: String,
}
