//! Postgres-backed [`ImportStore`].

use super::repo::{posts, roles, users};
use async_trait::async_trait;
use inkwell_domain::{NewPost, NewUser, Post, User, UserId};
use inkwell_import::{ImportStore, LookupKey, StoreError};
use sqlx::PgPool;

/// Import store writing straight to the application tables.
#[derive(Clone)]
pub struct PgImportStore {
    pool: PgPool,
}

impl PgImportStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn store_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        let constraint = db_err
            .constraint()
            .map(str::to_string)
            .unwrap_or_else(|| db_err.message().to_string());
        match db_err.code().as_deref() {
            Some("23505") => return StoreError::UniqueViolation(constraint),
            Some("23503") => return StoreError::MissingReference(constraint),
            _ => {}
        }
    }
    StoreError::backend(err)
}

fn lookup_sql(key: LookupKey) -> &'static str {
    match key {
        LookupKey::UserEmail => "SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)",
        LookupKey::UserMobileNumber => {
            "SELECT EXISTS(SELECT 1 FROM users WHERE mobile_number = $1)"
        }
        LookupKey::UserId => "SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)",
        LookupKey::PostTitle => "SELECT EXISTS(SELECT 1 FROM posts WHERE title = $1)",
    }
}

#[async_trait]
impl ImportStore for PgImportStore {
    async fn exists(&self, key: LookupKey, value: &str) -> Result<bool, StoreError> {
        let query = sqlx::query_scalar::<_, bool>(lookup_sql(key));
        let query = match key {
            // A non-numeric id can never match a row.
            LookupKey::UserId => match value.trim().parse::<i64>() {
                Ok(id) => query.bind(id),
                Err(_) => return Ok(false),
            },
            _ => query.bind(value.to_string()),
        };
        query.fetch_one(&self.pool).await.map_err(store_error)
    }

    async fn find_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        users::find_by_id(&self.pool, id).await.map_err(store_error)
    }

    async fn insert_user(&self, user: NewUser, role: &str) -> Result<User, StoreError> {
        let mut tx = self.pool.begin().await.map_err(store_error)?;
        let created = users::insert(&mut *tx, &user).await.map_err(store_error)?;
        roles::assign(&mut *tx, created.id, role)
            .await
            .map_err(store_error)?;
        tx.commit().await.map_err(store_error)?;
        Ok(created)
    }

    async fn insert_post(&self, post: NewPost) -> Result<Post, StoreError> {
        let mut tx = self.pool.begin().await.map_err(store_error)?;
        let created = posts::insert(&mut *tx, &post).await.map_err(store_error)?;
        tx.commit().await.map_err(store_error)?;
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_sql_targets_key_column() {
        for key in [
            LookupKey::UserEmail,
            LookupKey::UserMobileNumber,
            LookupKey::UserId,
            LookupKey::PostTitle,
        ] {
            let (table, column) = key.column();
            let sql = lookup_sql(key);
            assert!(sql.contains(&format!("FROM {table} WHERE {column} = $1")), "{sql}");
        }
    }

    #[test]
    fn test_non_database_errors_are_backend() {
        let err = store_error(sqlx::Error::RowNotFound);
        assert!(matches!(err, StoreError::Backend(_)));
    }

    #[tokio::test]
    async fn test_non_numeric_user_id_never_exists() {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/inkwell_test")
            .unwrap();
        let store = PgImportStore::new(pool);
        assert!(!store.exists(LookupKey::UserId, "abc").await.unwrap());
    }
}
