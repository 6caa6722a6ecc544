//! Blog post import.

use crate::error::{RowError, StoreError};
use crate::pipeline::{ImportKind, RowImporter};
use crate::row::RawRow;
use crate::rules::{Check, FieldRules, RuleTable};
use crate::store::{ImportStore, LookupKey};
use async_trait::async_trait;
use chrono::NaiveDate;
use inkwell_domain::{NewPost, UserId};

/// Imports posts on behalf of existing adult users.
#[derive(Debug, Clone)]
pub struct PostsImporter {
    rules: RuleTable,
}

impl PostsImporter {
    pub fn new() -> Self {
        Self {
            rules: Self::rule_table(),
        }
    }

    pub fn rule_table() -> RuleTable {
        RuleTable::new("posts")
            .field(
                FieldRules::required("title")
                    .message("The title field is required.")
                    .check(Check::Text)
                    .check(Check::MaxLength(255))
                    .check(Check::Unique(LookupKey::PostTitle))
                    .message("A post with this title already exists in the database."),
            )
            .field(
                FieldRules::required("body")
                    .message("The body field is required.")
                    .check(Check::Text),
            )
            .field(
                FieldRules::required("user_id")
                    .message("The user_id field is required.")
                    .check(Check::Integer)
                    .check(Check::Exists(LookupKey::UserId))
                    .message("The specified user does not exist in the database.")
                    .check(Check::AdultUser),
            )
            .field(FieldRules::nullable("image").check(Check::Text))
    }
}

impl Default for PostsImporter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RowImporter for PostsImporter {
    type Record = NewPost;

    fn kind(&self) -> ImportKind {
        ImportKind::Posts
    }

    fn rules(&self) -> &RuleTable {
        &self.rules
    }

    fn transform(&self, row: &RawRow, _today: NaiveDate) -> Result<NewPost, RowError> {
        let user_id = row
            .get("user_id")
            .ok_or_else(|| RowError::transform("user_id", "missing value"))
            .and_then(|raw| {
                UserId::parse(raw).map_err(|e| RowError::transform("user_id", e.to_string()))
            })?;

        Ok(NewPost {
            title: row.get("title").unwrap_or_default().to_string(),
            body: row.get("body").unwrap_or_default().to_string(),
            user_id,
            image: row.get("image").map(str::to_string),
        })
    }

    async fn persist(&self, store: &dyn ImportStore, record: NewPost) -> Result<(), StoreError> {
        store.insert_post(record).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkwell_test_utils::date;

    #[test]
    fn test_transform() {
        let row = RawRow::new()
            .with("title", "Hello")
            .with("body", "World")
            .with("user_id", " 7 ")
            .with("image", "");
        let post = PostsImporter::new().transform(&row, date(2024, 1, 1)).unwrap();
        assert_eq!(post.user_id, UserId::new(7));
        assert_eq!(post.image, None);
    }

    #[test]
    fn test_transform_rejects_bad_user_id() {
        let row = RawRow::new().with("user_id", "0");
        let err = PostsImporter::new().transform(&row, date(2024, 1, 1)).unwrap_err();
        assert!(err.to_string().starts_with("invalid value for user_id"));
    }
}
