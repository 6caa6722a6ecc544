use chrono::{DateTime, Utc};
use inkwell_common_core::{PostId, UserId};
use serde::Serialize;

/// A blog post owned by one user.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub body: String,
    pub user_id: UserId,
    /// Storage path of the post image, if any.
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields needed to insert a post.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub body: String,
    pub user_id: UserId,
    pub image: Option<String>,
}
