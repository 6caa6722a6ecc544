//! `posts` and `category_post` tables.

use inkwell_domain::{Category, CategoryId, NewPost, Post, PostId, UserId};
use serde::Serialize;
use sqlx::{PgConnection, PgExecutor, PgPool};
use std::collections::HashMap;

/// Author fields shown alongside a post.
#[derive(Debug, Clone, Serialize)]
pub struct Author {
    pub id: UserId,
    pub name: String,
}

/// A post with its author and categories.
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    #[serde(flatten)]
    pub post: Post,
    pub user: Author,
    pub categories: Vec<Category>,
}

#[derive(sqlx::FromRow)]
struct PostRow {
    #[sqlx(flatten)]
    post: Post,
    author_name: String,
}

#[derive(sqlx::FromRow)]
struct PostCategoryRow {
    post_id: PostId,
    #[sqlx(flatten)]
    category: Category,
}

const VIEW_SELECT: &str = "SELECT p.*, u.name AS author_name
     FROM posts p
     JOIN users u ON u.id = p.user_id";

/// Which posts to load as views.
#[derive(Debug, Clone, Copy)]
pub enum ViewFilter {
    All,
    Id(PostId),
    Author(UserId),
    Category(CategoryId),
}

/// Load posts matching `filter` with authors and categories attached.
pub async fn views(pool: &PgPool, filter: ViewFilter) -> sqlx::Result<Vec<PostView>> {
    let rows = match filter {
        ViewFilter::All => {
            sqlx::query_as::<_, PostRow>(&format!("{VIEW_SELECT} ORDER BY p.id"))
                .fetch_all(pool)
                .await?
        }
        ViewFilter::Id(id) => {
            sqlx::query_as::<_, PostRow>(&format!("{VIEW_SELECT} WHERE p.id = $1"))
                .bind(id)
                .fetch_all(pool)
                .await?
        }
        ViewFilter::Author(user_id) => {
            sqlx::query_as::<_, PostRow>(&format!("{VIEW_SELECT} WHERE p.user_id = $1 ORDER BY p.id"))
                .bind(user_id)
                .fetch_all(pool)
                .await?
        }
        ViewFilter::Category(category_id) => {
            sqlx::query_as::<_, PostRow>(&format!(
                "{VIEW_SELECT}
                 JOIN category_post cp ON cp.post_id = p.id
                 WHERE cp.category_id = $1
                 ORDER BY p.id"
            ))
            .bind(category_id)
            .fetch_all(pool)
            .await?
        }
    };

    let ids: Vec<i64> = rows.iter().map(|row| row.post.id.get()).collect();
    let mut categories = categories_by_post(pool, &ids).await?;

    Ok(rows
        .into_iter()
        .map(|row| PostView {
            categories: categories.remove(&row.post.id).unwrap_or_default(),
            user: Author {
                id: row.post.user_id,
                name: row.author_name,
            },
            post: row.post,
        })
        .collect())
}

/// Load one post view.
pub async fn view(pool: &PgPool, id: PostId) -> sqlx::Result<Option<PostView>> {
    Ok(views(pool, ViewFilter::Id(id)).await?.into_iter().next())
}

async fn categories_by_post(
    pool: &PgPool,
    post_ids: &[i64],
) -> sqlx::Result<HashMap<PostId, Vec<Category>>> {
    if post_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = sqlx::query_as::<_, PostCategoryRow>(
        "SELECT cp.post_id, c.*
         FROM category_post cp
         JOIN categories c ON c.id = cp.category_id
         WHERE cp.post_id = ANY($1)
         ORDER BY c.name",
    )
    .bind(post_ids)
    .fetch_all(pool)
    .await?;

    let mut grouped: HashMap<PostId, Vec<Category>> = HashMap::new();
    for row in rows {
        grouped.entry(row.post_id).or_default().push(row.category);
    }
    Ok(grouped)
}

pub async fn find_by_id<'e>(db: impl PgExecutor<'e>, id: PostId) -> sqlx::Result<Option<Post>> {
    sqlx::query_as::<_, Post>("SELECT * FROM posts WHERE id = $1")
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn count<'e>(db: impl PgExecutor<'e>) -> sqlx::Result<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM posts").fetch_one(db).await
}

pub async fn insert<'e>(db: impl PgExecutor<'e>, post: &NewPost) -> sqlx::Result<Post> {
    sqlx::query_as::<_, Post>(
        "INSERT INTO posts (title, body, user_id, image)
         VALUES ($1, $2, $3, $4)
         RETURNING *",
    )
    .bind(&post.title)
    .bind(&post.body)
    .bind(post.user_id)
    .bind(&post.image)
    .fetch_one(db)
    .await
}

pub async fn update<'e>(
    db: impl PgExecutor<'e>,
    id: PostId,
    title: &str,
    body: &str,
    user_id: UserId,
) -> sqlx::Result<Option<Post>> {
    sqlx::query_as::<_, Post>(
        "UPDATE posts
         SET title = $2, body = $3, user_id = $4, updated_at = NOW()
         WHERE id = $1
         RETURNING *",
    )
    .bind(id)
    .bind(title)
    .bind(body)
    .bind(user_id)
    .fetch_optional(db)
    .await
}

pub async fn set_image<'e>(
    db: impl PgExecutor<'e>,
    id: PostId,
    image: Option<&str>,
) -> sqlx::Result<()> {
    sqlx::query("UPDATE posts SET image = $2, updated_at = NOW() WHERE id = $1")
        .bind(id)
        .bind(image)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn delete<'e>(db: impl PgExecutor<'e>, id: PostId) -> sqlx::Result<bool> {
    let result = sqlx::query("DELETE FROM posts WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Whether a post other than `except` already uses `title`.
pub async fn title_taken<'e>(
    db: impl PgExecutor<'e>,
    title: &str,
    except: Option<PostId>,
) -> sqlx::Result<bool> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM posts WHERE title = $1 AND id IS DISTINCT FROM $2)",
    )
    .bind(title)
    .bind(except)
    .fetch_one(db)
    .await
}

/// Add categories, keeping existing ones.
pub async fn attach_categories<'e>(
    db: impl PgExecutor<'e>,
    post_id: PostId,
    category_ids: &[i64],
) -> sqlx::Result<()> {
    sqlx::query(
        "INSERT INTO category_post (post_id, category_id)
         SELECT $1, UNNEST($2::BIGINT[])
         ON CONFLICT DO NOTHING",
    )
    .bind(post_id)
    .bind(category_ids)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn detach_categories<'e>(
    db: impl PgExecutor<'e>,
    post_id: PostId,
    category_ids: &[i64],
) -> sqlx::Result<()> {
    sqlx::query("DELETE FROM category_post WHERE post_id = $1 AND category_id = ANY($2)")
        .bind(post_id)
        .bind(category_ids)
        .execute(db)
        .await?;
    Ok(())
}

/// Replace the post's categories with exactly `category_ids`.
pub async fn sync_categories(
    conn: &mut PgConnection,
    post_id: PostId,
    category_ids: &[i64],
) -> sqlx::Result<()> {
    sqlx::query("DELETE FROM category_post WHERE post_id = $1")
        .bind(post_id)
        .execute(&mut *conn)
        .await?;
    attach_categories(&mut *conn, post_id, category_ids).await
}

/// Rewrite the post and, when `category_ids` is given, its categories.
///
/// Both run on `conn`; pass a transaction so a failed category write leaves
/// the post untouched.
pub async fn update_with_categories(
    conn: &mut PgConnection,
    id: PostId,
    title: &str,
    body: &str,
    user_id: UserId,
    category_ids: Option<&[i64]>,
) -> sqlx::Result<Option<Post>> {
    let Some(post) = update(&mut *conn, id, title, body, user_id).await? else {
        return Ok(None);
    };
    if let Some(ids) = category_ids {
        sync_categories(&mut *conn, id, ids).await?;
    }
    Ok(Some(post))
}
