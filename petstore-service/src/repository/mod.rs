//! Data access for pets, orders and users
//!
//! One repository per resource, each borrowing the shared pool from
//! [`Database`](crate::database::Database). Every method issues a fixed
//! parameterized statement (or, for batch user creation, one transaction) and
//! reports failures as [`DatabaseError`](crate::error::DatabaseError) tagged
//! with the operation that was running.
//!
//! # Example
//!
//! ```rust,ignore
//! use petstore_service::{database::Database, repository::PetRepository};
//!
//! let db = Database::in_memory().await?;
//! let pets = PetRepository::new(db.pool());
//! let id = pets.insert("Fido", "available").await?;
//! let fido = pets.find_by_id(id).await?;
//! ```

mod orders;
mod pets;
mod users;

pub use orders::OrderRepository;
pub use pets::PetRepository;
pub use users::UserRepository;

use sqlx::{QueryBuilder, Sqlite};

/// Append `IN (?, ?, ...)` with one bound parameter per value
fn push_in_list<'args>(builder: &mut QueryBuilder<'args, Sqlite>, values: &'args [String]) {
    builder.push(" IN (");
    let mut separated = builder.separated(", ");
    for value in values {
        separated.push_bind(value.as_str());
    }
    separated.push_unseparated(")");
}
