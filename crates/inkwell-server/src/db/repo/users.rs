//! `users` table.

use chrono::NaiveDate;
use inkwell_domain::{NewUser, User, UserId};
use serde::Serialize;
use sqlx::PgExecutor;

/// A user together with its role names.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct UserWithRoles {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub user: User,
    pub roles: Vec<String>,
}

/// Editable profile fields.
#[derive(Debug, Clone)]
pub struct UserChanges {
    pub name: String,
    pub email: Option<String>,
    pub mobile_number: String,
    pub address: String,
    pub date_of_birth: Option<NaiveDate>,
    pub age: Option<i32>,
}

pub async fn find_by_id<'e>(db: impl PgExecutor<'e>, id: UserId) -> sqlx::Result<Option<User>> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn find_by_email<'e>(db: impl PgExecutor<'e>, email: &str) -> sqlx::Result<Option<User>> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(db)
        .await
}

pub async fn list<'e>(db: impl PgExecutor<'e>) -> sqlx::Result<Vec<User>> {
    sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY id")
        .fetch_all(db)
        .await
}

/// Every user with its roles, for exports.
pub async fn list_with_roles<'e>(db: impl PgExecutor<'e>) -> sqlx::Result<Vec<UserWithRoles>> {
    sqlx::query_as::<_, UserWithRoles>(
        "SELECT u.*,
                COALESCE(
                    array_agg(r.name ORDER BY r.name) FILTER (WHERE r.name IS NOT NULL),
                    '{}'
                ) AS roles
         FROM users u
         LEFT JOIN user_roles ur ON ur.user_id = u.id
         LEFT JOIN roles r ON r.id = ur.role_id
         GROUP BY u.id
         ORDER BY u.id",
    )
    .fetch_all(db)
    .await
}

pub async fn insert<'e>(db: impl PgExecutor<'e>, user: &NewUser) -> sqlx::Result<User> {
    sqlx::query_as::<_, User>(
        "INSERT INTO users (name, email, mobile_number, address, date_of_birth, age, password_hash)
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         RETURNING *",
    )
    .bind(&user.name)
    .bind(&user.email)
    .bind(&user.mobile_number)
    .bind(&user.address)
    .bind(user.date_of_birth)
    .bind(user.age)
    .bind(&user.password_hash)
    .fetch_one(db)
    .await
}

/// Apply profile changes. A `None` email keeps the current one.
pub async fn update<'e>(
    db: impl PgExecutor<'e>,
    id: UserId,
    changes: &UserChanges,
) -> sqlx::Result<Option<User>> {
    sqlx::query_as::<_, User>(
        "UPDATE users
         SET name = $2,
             email = COALESCE($3, email),
             mobile_number = $4,
             address = $5,
             date_of_birth = $6,
             age = $7,
             updated_at = NOW()
         WHERE id = $1
         RETURNING *",
    )
    .bind(id)
    .bind(&changes.name)
    .bind(&changes.email)
    .bind(&changes.mobile_number)
    .bind(&changes.address)
    .bind(changes.date_of_birth)
    .bind(changes.age)
    .fetch_optional(db)
    .await
}

pub async fn update_password<'e>(
    db: impl PgExecutor<'e>,
    id: UserId,
    password_hash: &str,
) -> sqlx::Result<()> {
    sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
        .bind(id)
        .bind(password_hash)
        .execute(db)
        .await?;
    Ok(())
}

/// Returns whether a row was deleted.
pub async fn delete<'e>(db: impl PgExecutor<'e>, id: UserId) -> sqlx::Result<bool> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Whether another user already has `mobile_number`.
pub async fn mobile_taken<'e>(
    db: impl PgExecutor<'e>,
    mobile_number: &str,
    except: Option<UserId>,
) -> sqlx::Result<bool> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM users WHERE mobile_number = $1 AND id IS DISTINCT FROM $2)",
    )
    .bind(mobile_number)
    .bind(except)
    .fetch_one(db)
    .await
}

/// Whether another user already has `email`.
pub async fn email_taken<'e>(
    db: impl PgExecutor<'e>,
    email: &str,
    except: Option<UserId>,
) -> sqlx::Result<bool> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM users WHERE email = $1 AND id IS DISTINCT FROM $2)",
    )
    .bind(email)
    .bind(except)
    .fetch_one(db)
    .await
}
