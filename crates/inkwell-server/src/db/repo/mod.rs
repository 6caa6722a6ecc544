//! Table access.
//!
//! Single-statement functions take any executor so they can run against the
//! pool or inside a caller's transaction. Functions issuing several
//! statements either take the pool and manage their own transaction, or take
//! a connection and join the caller's.

pub mod categories;
pub mod exports;
pub mod posts;
pub mod roles;
pub mod tokens;
pub mod users;

/// Whether `err` is a Postgres unique violation.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    sqlx_code(err).as_deref() == Some("23505")
}

/// Whether `err` is a Postgres foreign key violation.
pub fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    sqlx_code(err).as_deref() == Some("23503")
}

fn sqlx_code(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().map(|c| c.into_owned()),
        _ => None,
    }
}
