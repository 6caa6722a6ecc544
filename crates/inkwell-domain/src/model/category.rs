use chrono::{DateTime, Utc};
use inkwell_common_core::CategoryId;
use serde::Serialize;

/// A named post category.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
