//! In-memory [`ImportStore`].

use crate::error::StoreError;
use crate::store::{ImportStore, LookupKey};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use inkwell_domain::{NewPost, NewUser, Post, PostId, User, UserId};
use parking_lot::RwLock;

#[derive(Debug, Default)]
struct State {
    users: Vec<User>,
    posts: Vec<Post>,
    roles: Vec<(UserId, String)>,
}

/// Store keeping records in memory, enforcing the same unique and reference
/// constraints as the database schema.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a user directly, bypassing validation.
    pub fn seed_user(
        &self,
        name: &str,
        email: &str,
        mobile_number: &str,
        date_of_birth: Option<NaiveDate>,
    ) -> User {
        let mut state = self.state.write();
        let user = Self::build_user(
            &state,
            NewUser {
                name: name.into(),
                email: email.into(),
                mobile_number: mobile_number.into(),
                address: String::new(),
                date_of_birth,
                age: None,
                password_hash: String::new(),
            },
        );
        state.users.push(user.clone());
        user
    }

    pub fn users(&self) -> Vec<User> {
        self.state.read().users.clone()
    }

    pub fn posts(&self) -> Vec<Post> {
        self.state.read().posts.clone()
    }

    pub fn roles_of(&self, user: UserId) -> Vec<String> {
        self.state
            .read()
            .roles
            .iter()
            .filter(|(id, _)| *id == user)
            .map(|(_, role)| role.clone())
            .collect()
    }

    fn build_user(state: &State, new: NewUser) -> User {
        let now = Utc::now();
        User {
            id: UserId::new(state.users.len() as i64 + 1),
            name: new.name,
            email: new.email,
            mobile_number: new.mobile_number,
            address: new.address,
            date_of_birth: new.date_of_birth,
            age: new.age,
            password_hash: new.password_hash,
            created_at: now,
            updated_at: now,
        }
    }
}

#[async_trait]
impl ImportStore for MemoryStore {
    async fn exists(&self, key: LookupKey, value: &str) -> Result<bool, StoreError> {
        let state = self.state.read();
        Ok(match key {
            LookupKey::UserEmail => state.users.iter().any(|u| u.email == value),
            LookupKey::UserMobileNumber => state.users.iter().any(|u| u.mobile_number == value),
            LookupKey::UserId => match UserId::parse(value) {
                Ok(id) => state.users.iter().any(|u| u.id == id),
                Err(_) => false,
            },
            LookupKey::PostTitle => state.posts.iter().any(|p| p.title == value),
        })
    }

    async fn find_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.state.read().users.iter().find(|u| u.id == id).cloned())
    }

    async fn insert_user(&self, user: NewUser, role: &str) -> Result<User, StoreError> {
        let mut state = self.state.write();
        if state.users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::UniqueViolation("users_email_key".into()));
        }
        if state.users.iter().any(|u| u.mobile_number == user.mobile_number) {
            return Err(StoreError::UniqueViolation("users_mobile_number_key".into()));
        }
        let user = Self::build_user(&state, user);
        state.users.push(user.clone());
        state.roles.push((user.id, role.to_string()));
        Ok(user)
    }

    async fn insert_post(&self, post: NewPost) -> Result<Post, StoreError> {
        let mut state = self.state.write();
        if state.posts.iter().any(|p| p.title == post.title) {
            return Err(StoreError::UniqueViolation("posts_title_key".into()));
        }
        if !state.users.iter().any(|u| u.id == post.user_id) {
            return Err(StoreError::MissingReference(format!("user {}", post.user_id)));
        }
        let now = Utc::now();
        let post = Post {
            id: PostId::new(state.posts.len() as i64 + 1),
            title: post.title,
            body: post.body,
            user_id: post.user_id,
            image: post.image,
            created_at: now,
            updated_at: now,
        };
        state.posts.push(post.clone());
        Ok(post)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unique_constraints() {
        let store = MemoryStore::new();
        store.seed_user("Ada", "ada@example.com", "0771", None);

        let duplicate = NewUser {
            name: "Other".into(),
            email: "ada@example.com".into(),
            mobile_number: "0779".into(),
            address: "x".into(),
            date_of_birth: None,
            age: None,
            password_hash: String::new(),
        };
        let err = store.insert_user(duplicate, "member").await.unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation(_)));
        assert_eq!(store.users().len(), 1);
    }

    #[tokio::test]
    async fn test_post_requires_existing_user() {
        let store = MemoryStore::new();
        let post = NewPost {
            title: "Hello".into(),
            body: "World".into(),
            user_id: UserId::new(42),
            image: None,
        };
        let err = store.insert_post(post).await.unwrap_err();
        assert!(matches!(err, StoreError::MissingReference(_)));
    }

    #[tokio::test]
    async fn test_lookup_keys() {
        let store = MemoryStore::new();
        let user = store.seed_user("Ada", "ada@example.com", "0771", None);

        assert!(store.exists(LookupKey::UserEmail, "ada@example.com").await.unwrap());
        assert!(store.exists(LookupKey::UserMobileNumber, "0771").await.unwrap());
        assert!(store.exists(LookupKey::UserId, &user.id.to_string()).await.unwrap());
        assert!(!store.exists(LookupKey::UserId, "not-a-number").await.unwrap());
        assert!(!store.exists(LookupKey::PostTitle, "Hello").await.unwrap());
    }
}
