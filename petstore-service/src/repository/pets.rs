use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use super::push_in_list;
use crate::{
    error::{DatabaseError, DatabaseOperation, Result},
    models::{Inventory, Pet},
};

/// Pet persistence; only `id`, `name` and `status` are stored
#[derive(Debug, Clone, Copy)]
pub struct PetRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> PetRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a pet and return the id assigned by the store
    pub async fn insert(&self, name: &str, status: &str) -> Result<i64> {
        let result = sqlx::query("INSERT INTO pets (name, status) VALUES (?, ?)")
            .bind(name)
            .bind(status)
            .execute(self.pool)
            .await
            .map_err(|e| DatabaseError::from(e).during(DatabaseOperation::Insert))?;
        Ok(result.last_insert_rowid())
    }

    /// Replace name and status; a missing id affects no rows and is not an error
    pub async fn update(&self, id: i64, name: &str, status: &str) -> Result<u64> {
        let result = sqlx::query("UPDATE pets SET name = ?, status = ? WHERE id = ?")
            .bind(name)
            .bind(status)
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| DatabaseError::from(e).during(DatabaseOperation::Update))?;
        Ok(result.rows_affected())
    }

    pub async fn update_name(&self, id: i64, name: &str) -> Result<u64> {
        let result = sqlx::query("UPDATE pets SET name = ? WHERE id = ?")
            .bind(name)
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| DatabaseError::from(e).during(DatabaseOperation::Update))?;
        Ok(result.rows_affected())
    }

    pub async fn update_status(&self, id: i64, status: &str) -> Result<u64> {
        let result = sqlx::query("UPDATE pets SET status = ? WHERE id = ?")
            .bind(status)
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| DatabaseError::from(e).during(DatabaseOperation::Update))?;
        Ok(result.rows_affected())
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Pet>> {
        let pet = sqlx::query_as::<_, Pet>("SELECT id, name, status FROM pets WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| DatabaseError::from(e).during(DatabaseOperation::Query))?;
        Ok(pet)
    }

    /// Delete by id; returns the number of rows removed (0 or 1)
    pub async fn delete(&self, id: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM pets WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| DatabaseError::from(e).during(DatabaseOperation::Delete))?;
        Ok(result.rows_affected())
    }

    /// Pets whose status is any of `statuses`
    pub async fn find_by_statuses(&self, statuses: &[String]) -> Result<Vec<Pet>> {
        if statuses.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder: QueryBuilder<'_, Sqlite> =
            QueryBuilder::new("SELECT id, name, status FROM pets WHERE status");
        push_in_list(&mut builder, statuses);

        let pets = builder
            .build_query_as::<Pet>()
            .fetch_all(self.pool)
            .await
            .map_err(|e| DatabaseError::from(e).during(DatabaseOperation::Query))?;
        Ok(pets)
    }

    /// Distinct pets carrying at least one tag named in `tags`
    pub async fn find_by_tags(&self, tags: &[String]) -> Result<Vec<Pet>> {
        if tags.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder: QueryBuilder<'_, Sqlite> = QueryBuilder::new(
            "SELECT DISTINCT p.id, p.name, p.status FROM pets p \
             JOIN pet_tags pt ON p.id = pt.pet_id \
             JOIN tags t ON pt.tag_id = t.id \
             WHERE t.name",
        );
        push_in_list(&mut builder, tags);

        let pets = builder
            .build_query_as::<Pet>()
            .fetch_all(self.pool)
            .await
            .map_err(|e| {
                DatabaseError::from(e)
                    .during(DatabaseOperation::Query)
                    .add_context("pet_tags")
            })?;
        Ok(pets)
    }

    /// Pet counts per status
    pub async fn inventory(&self) -> Result<Inventory> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM pets GROUP BY status")
                .fetch_all(self.pool)
                .await
                .map_err(|e| DatabaseError::from(e).during(DatabaseOperation::Query))?;
        Ok(rows.into_iter().collect())
    }
}
