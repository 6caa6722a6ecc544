//! Persistence seam used by the pipeline.

use crate::error::StoreError;
use async_trait::async_trait;
use inkwell_domain::{NewPost, NewUser, Post, User, UserId};
use std::fmt;

/// Columns the rule engine can look up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupKey {
    UserEmail,
    UserMobileNumber,
    UserId,
    PostTitle,
}

impl LookupKey {
    /// `(table, column)` the key refers to.
    pub fn column(&self) -> (&'static str, &'static str) {
        match self {
            Self::UserEmail => ("users", "email"),
            Self::UserMobileNumber => ("users", "mobile_number"),
            Self::UserId => ("users", "id"),
            Self::PostTitle => ("posts", "title"),
        }
    }
}

impl fmt::Display for LookupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (table, column) = self.column();
        write!(f, "{table}.{column}")
    }
}

/// Storage operations the import pipeline needs.
///
/// Every insert is atomic on its own: an implementation backed by a database
/// runs each call in its own transaction.
#[async_trait]
pub trait ImportStore: Send + Sync {
    /// Whether any record has `value` in the column named by `key`.
    async fn exists(&self, key: LookupKey, value: &str) -> Result<bool, StoreError>;

    async fn find_user(&self, id: UserId) -> Result<Option<User>, StoreError>;

    /// Insert a user and assign `role` to it.
    async fn insert_user(&self, user: NewUser, role: &str) -> Result<User, StoreError>;

    async fn insert_post(&self, post: NewPost) -> Result<Post, StoreError>;
}
