use sqlx::{Executor, Sqlite, SqlitePool};

use crate::{
    error::{DatabaseError, DatabaseOperation, Result},
    models::User,
};

const INSERT_USER: &str = "INSERT INTO users \
     (username, first_name, last_name, email, password, phone, user_status) \
     VALUES (?, ?, ?, ?, ?, ?, ?)";

const SELECT_USER: &str = "SELECT id, username, first_name, last_name, email, password, phone, user_status \
     FROM users WHERE username = ?";

async fn insert_user<'e, E>(executor: E, user: &User) -> std::result::Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(INSERT_USER)
        .bind(&user.username)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.password)
        .bind(&user.phone)
        .bind(user.user_status)
        .execute(executor)
        .await?;
    Ok(result.last_insert_rowid())
}

/// User persistence, keyed by username for everything except insert
#[derive(Debug, Clone, Copy)]
pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a user and return the id assigned by the store
    pub async fn insert(&self, user: &User) -> Result<i64> {
        let id = insert_user(self.pool, user)
            .await
            .map_err(|e| DatabaseError::from(e).during(DatabaseOperation::Insert))?;
        Ok(id)
    }

    /// Insert every user in one transaction
    ///
    /// The first failing insert rolls the whole batch back; on success the
    /// returned ids are in input order.
    pub async fn insert_batch(&self, users: &[User]) -> Result<Vec<i64>> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            DatabaseError::from(e)
                .during(DatabaseOperation::Transaction)
                .add_context("begin")
        })?;

        let mut ids = Vec::with_capacity(users.len());
        for (index, user) in users.iter().enumerate() {
            match insert_user(&mut *tx, user).await {
                Ok(id) => ids.push(id),
                Err(e) => {
                    let err = DatabaseError::from(e)
                        .during(DatabaseOperation::Insert)
                        .add_context(format!("batch item {index}"));
                    if let Err(rollback) = tx.rollback().await {
                        tracing::error!(error = %rollback, "Batch rollback failed");
                    }
                    tracing::warn!(index, batch_size = users.len(), "User batch rolled back");
                    return Err(err.into());
                }
            }
        }

        tx.commit().await.map_err(|e| {
            DatabaseError::transaction_failed(e.to_string()).add_context("commit")
        })?;
        Ok(ids)
    }

    /// Exact, plain-text match on username and password
    pub async fn find_by_credentials(&self, username: &str, password: &str) -> Result<Option<i64>> {
        let id = sqlx::query_scalar::<_, i64>(
            "SELECT id FROM users WHERE username = ? AND password = ?",
        )
        .bind(username)
        .bind(password)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| DatabaseError::from(e).during(DatabaseOperation::Query))?;
        Ok(id)
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(SELECT_USER)
            .bind(username)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| DatabaseError::from(e).during(DatabaseOperation::Query))?;
        Ok(user)
    }

    /// Overwrite every mutable field of the users named `username`
    ///
    /// `user.username` becomes the new name, so this can rename.
    pub async fn update_by_username(&self, username: &str, user: &User) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE users SET username = ?, first_name = ?, last_name = ?, email = ?, \
             password = ?, phone = ?, user_status = ? WHERE username = ?",
        )
        .bind(&user.username)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.password)
        .bind(&user.phone)
        .bind(user.user_status)
        .bind(username)
        .execute(self.pool)
        .await
        .map_err(|e| DatabaseError::from(e).during(DatabaseOperation::Update))?;
        Ok(result.rows_affected())
    }

    pub async fn delete_by_username(&self, username: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM users WHERE username = ?")
            .bind(username)
            .execute(self.pool)
            .await
            .map_err(|e| DatabaseError::from(e).during(DatabaseOperation::Delete))?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{database::Database, error::Error};

    fn user(username: &str, password: &str) -> User {
        User {
            username: username.into(),
            first_name: "First".into(),
            last_name: "Last".into(),
            email: format!("{username}@example.com"),
            password: password.into(),
            phone: "555-0100".into(),
            user_status: 1,
            ..User::default()
        }
    }

    async fn user_count(db: &Database) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(db.pool())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_find_by_username() {
        let db = Database::in_memory().await.unwrap();
        let repo = UserRepository::new(db.pool());

        let id = repo.insert(&user("bob", "secret")).await.unwrap();
        let found = repo.find_by_username("bob").await.unwrap().unwrap();
        assert_eq!(found, User { id, ..user("bob", "secret") });
        assert!(repo.find_by_username("alice").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_credentials_match_exactly() {
        let db = Database::in_memory().await.unwrap();
        let repo = UserRepository::new(db.pool());
        let id = repo.insert(&user("bob", "secret")).await.unwrap();

        assert_eq!(repo.find_by_credentials("bob", "secret").await.unwrap(), Some(id));
        assert_eq!(repo.find_by_credentials("bob", "Secret").await.unwrap(), None);
        assert_eq!(repo.find_by_credentials("bo", "secret").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_batch_assigns_ids_in_order() {
        let db = Database::in_memory().await.unwrap();
        let repo = UserRepository::new(db.pool());

        let ids = repo
            .insert_batch(&[user("a", "1"), user("b", "2"), user("c", "3")])
            .await
            .unwrap();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(user_count(&db).await, 3);
    }

    #[tokio::test]
    async fn test_batch_failure_rolls_back_everything() {
        let db = Database::in_memory().await.unwrap();
        sqlx::query(
            "CREATE TRIGGER reject_mallory BEFORE INSERT ON users \
             WHEN NEW.username = 'mallory' \
             BEGIN SELECT RAISE(ABORT, 'rejected'); END",
        )
        .execute(db.pool())
        .await
        .unwrap();
        let repo = UserRepository::new(db.pool());

        let err = repo
            .insert_batch(&[user("a", "1"), user("b", "2"), user("mallory", "3")])
            .await
            .unwrap_err();
        match err {
            Error::Database(e) => {
                assert_eq!(e.operation, DatabaseOperation::Insert);
                assert_eq!(e.context.as_deref(), Some("batch item 2"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(user_count(&db).await, 0);

        // The connection is usable again after the rollback.
        repo.insert(&user("a", "1")).await.unwrap();
        assert_eq!(user_count(&db).await, 1);
    }

    #[tokio::test]
    async fn test_update_by_username_can_rename() {
        let db = Database::in_memory().await.unwrap();
        let repo = UserRepository::new(db.pool());
        repo.insert(&user("bob", "secret")).await.unwrap();

        let affected = repo
            .update_by_username("bob", &user("robert", "changed"))
            .await
            .unwrap();
        assert_eq!(affected, 1);
        assert!(repo.find_by_username("bob").await.unwrap().is_none());
        let renamed = repo.find_by_username("robert").await.unwrap().unwrap();
        assert_eq!(renamed.password, "changed");

        assert_eq!(
            repo.update_by_username("nobody", &user("x", "y")).await.unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_delete_by_username() {
        let db = Database::in_memory().await.unwrap();
        let repo = UserRepository::new(db.pool());
        repo.insert(&user("bob", "secret")).await.unwrap();

        assert_eq!(repo.delete_by_username("bob").await.unwrap(), 1);
        assert_eq!(repo.delete_by_username("bob").await.unwrap(), 0);
    }
}
