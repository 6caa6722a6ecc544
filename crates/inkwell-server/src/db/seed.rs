//! Startup seeding of the administrator account.

use super::repo::{roles, users};
use crate::config::SeedConfig;
use anyhow::{Context, Result};
use inkwell_domain::{age_on, hash_password, parse_date, NewUser};
use inkwell_policy::ADMIN_ROLE;
use sqlx::PgPool;
use tracing::{info, warn};

/// Create the configured administrator unless its email is already taken.
///
/// Returns whether an account was created.
pub async fn ensure_admin(pool: &PgPool, seed: &SeedConfig) -> Result<bool> {
    let (Some(email), Some(password)) = (&seed.admin_email, &seed.admin_password) else {
        return Ok(false);
    };

    if users::find_by_email(pool, email).await?.is_some() {
        info!(email = %email, "Administrator already present");
        return Ok(false);
    }

    let date_of_birth = seed.admin_date_of_birth.as_deref().and_then(parse_date);
    if date_of_birth.is_none() {
        warn!("Administrator has no valid date of birth and cannot create content");
    }
    let today = chrono::Utc::now().date_naive();

    let password_hash =
        hash_password(password).map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;
    let user = NewUser {
        name: seed.admin_name.clone(),
        email: email.clone(),
        mobile_number: String::new(),
        address: String::new(),
        date_of_birth,
        age: date_of_birth
            .and_then(|dob| age_on(dob, today))
            .map(|age| age as i32),
        password_hash,
    };

    let mut tx = pool.begin().await?;
    let created = users::insert(&mut *tx, &user)
        .await
        .context("Failed to insert administrator")?;
    roles::assign(&mut *tx, created.id, ADMIN_ROLE).await?;
    tx.commit().await?;

    info!(user_id = %created.id, email = %email, "Administrator created");
    Ok(true)
}
