//! Post updates against a live Postgres.
//!
//! Run with `DATABASE_URL` set and `--ignored`.

use inkwell_domain::{NewPost, NewUser, Post};
use inkwell_server::db::{
    repo::{categories, is_foreign_key_violation, posts, users},
    run_migrations,
};
use sqlx::PgPool;

async fn pool() -> PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = PgPool::connect(&url).await.unwrap();
    run_migrations(&pool).await.unwrap();
    pool
}

async fn seed_post(pool: &PgPool) -> Post {
    let tag = uuid::Uuid::new_v4().simple().to_string();
    let user = users::insert(
        pool,
        &NewUser {
            name: "Writer".into(),
            email: format!("writer-{tag}@example.com"),
            mobile_number: tag[..12].to_string(),
            address: "1 Loop Rd".into(),
            date_of_birth: None,
            age: None,
            password_hash: "x".into(),
        },
    )
    .await
    .unwrap();
    posts::insert(
        pool,
        &NewPost {
            title: format!("Original {tag}"),
            body: "Body".into(),
            user_id: user.id,
            image: None,
        },
    )
    .await
    .unwrap()
}

async fn category_count(pool: &PgPool, post: &Post) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM category_post WHERE post_id = $1")
        .bind(post.id)
        .fetch_one(pool)
        .await
        .unwrap()
}

#[tokio::test]
#[ignore]
async fn test_failed_category_sync_rolls_back_title() {
    let pool = pool().await;
    let post = seed_post(&pool).await;
    let tag = uuid::Uuid::new_v4().simple().to_string();
    let category = categories::insert(&pool, &format!("News {tag}")).await.unwrap();
    posts::attach_categories(&pool, post.id, &[category.id.get()]).await.unwrap();

    let mut tx = pool.begin().await.unwrap();
    let err = posts::update_with_categories(
        &mut *tx,
        post.id,
        &format!("Renamed {tag}"),
        "New body",
        post.user_id,
        Some([category.id.get(), i64::MAX].as_slice()),
    )
    .await
    .unwrap_err();
    assert!(is_foreign_key_violation(&err));
    drop(tx);

    let stored = posts::find_by_id(&pool, post.id).await.unwrap().unwrap();
    assert_eq!(stored.title, post.title);
    assert_eq!(stored.body, "Body");
    assert_eq!(category_count(&pool, &post).await, 1);
}

#[tokio::test]
#[ignore]
async fn test_update_replaces_categories_in_one_commit() {
    let pool = pool().await;
    let post = seed_post(&pool).await;
    let tag = uuid::Uuid::new_v4().simple().to_string();
    let first = categories::insert(&pool, &format!("First {tag}")).await.unwrap();
    let second = categories::insert(&pool, &format!("Second {tag}")).await.unwrap();
    posts::attach_categories(&pool, post.id, &[first.id.get()]).await.unwrap();

    let mut tx = pool.begin().await.unwrap();
    let updated = posts::update_with_categories(
        &mut *tx,
        post.id,
        &format!("Renamed {tag}"),
        "New body",
        post.user_id,
        Some([second.id.get()].as_slice()),
    )
    .await
    .unwrap()
    .unwrap();
    tx.commit().await.unwrap();

    assert_eq!(updated.title, format!("Renamed {tag}"));
    let linked: Vec<i64> =
        sqlx::query_scalar("SELECT category_id FROM category_post WHERE post_id = $1")
            .bind(post.id)
            .fetch_all(&pool)
            .await
            .unwrap();
    assert_eq!(linked, vec![second.id.get()]);
}

#[tokio::test]
#[ignore]
async fn test_missing_post_skips_category_sync() {
    let pool = pool().await;
    let post = seed_post(&pool).await;
    let missing = inkwell_domain::PostId::new(i64::MAX);

    let mut tx = pool.begin().await.unwrap();
    let result = posts::update_with_categories(
        &mut *tx,
        missing,
        &format!("Nobody {}", post.id),
        "Body",
        post.user_id,
        Some([i64::MAX].as_slice()),
    )
    .await
    .unwrap();
    assert!(result.is_none());
    tx.commit().await.unwrap();
}
