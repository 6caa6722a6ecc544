//! Posts, their images and their categories.

use super::upload::{read_file, Upload};
use crate::db::repo::{
    categories,
    posts::{self, PostView, ViewFilter},
    users,
};
use crate::error::{ApiError, ApiResult, ErrorContext};
use crate::middleware::{guard, guard_adult, guard_record, CurrentActor};
use crate::request::{CategoryIdsRequest, PostRequest, ValidatedJson};
use crate::response::ApiResponse;
use crate::state::AppState;
use axum::extract::{Multipart, Path, State};
use chrono::Utc;
use inkwell_domain::{NewPost, Post, PostId, UserId};
use inkwell_policy::{is_adult, Action, ResourceKind, MINIMUM_AGE};
use tracing::{info, warn};
use uuid::Uuid;

/// Largest accepted post image.
pub const MAX_IMAGE_BYTES: usize = 3 * 1024 * 1024;

const IMAGE_EXTENSIONS: &[&str] = &["jpeg", "png", "jpg", "gif", "webp"];

async fn find(state: &AppState, id: PostId) -> ApiResult<Post> {
    posts::find_by_id(&state.db, id)
        .await?
        .not_found("Post")
}

async fn view(state: &AppState, id: PostId) -> ApiResult<PostView> {
    posts::view(&state.db, id)
        .await?
        .not_found("Post")
}

async fn ensure_title_free(state: &AppState, title: &str, except: Option<PostId>) -> ApiResult<()> {
    if posts::title_taken(&state.db, title, except).await? {
        return Err(ApiError::field(
            "title",
            "A post with the same title already exists.",
        ));
    }
    Ok(())
}

async fn ensure_categories_exist(state: &AppState, ids: &[i64]) -> ApiResult<()> {
    let missing = categories::missing(&state.db, ids).await?;
    if !missing.is_empty() {
        return Err(ApiError::field(
            "category_ids",
            "The selected category is invalid.",
        ));
    }
    Ok(())
}

/// Check a new owner given on update: it must exist and be old enough.
async fn ensure_owner(state: &AppState, user_id: UserId) -> ApiResult<()> {
    let user = users::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::field("user_id", "The selected user id is invalid."))?;
    if !is_adult(user.date_of_birth, Utc::now().date_naive()) {
        return Err(ApiError::field(
            "user_id",
            format!("The user must be at least {MINIMUM_AGE} years old to create a post."),
        ));
    }
    Ok(())
}

fn check_image(upload: &Upload) -> ApiResult<&'static str> {
    let extension = upload
        .extension()
        .and_then(|ext| IMAGE_EXTENSIONS.iter().copied().find(|allowed| *allowed == ext));
    let looks_like_image = upload
        .content_type
        .as_deref()
        .map_or(true, |ct| ct.starts_with("image/"));

    match extension {
        Some(ext) if looks_like_image => Ok(ext),
        _ => Err(ApiError::field(
            "image",
            "The image must be a file of type: jpeg, png, jpg, gif, webp.",
        )),
    }
}

pub async fn index(
    State(state): State<AppState>,
    current: CurrentActor,
) -> ApiResult<ApiResponse<Vec<PostView>>> {
    guard(&current.actor, Action::View, ResourceKind::Posts)?;
    Ok(ApiResponse::ok(
        "Posts retrieved successfully",
        posts::views(&state.db, ViewFilter::All).await?,
    ))
}

/// Create a post owned by the caller. The age gate runs before anything else.
pub async fn store(
    State(state): State<AppState>,
    current: CurrentActor,
    ValidatedJson(req): ValidatedJson<PostRequest>,
) -> ApiResult<ApiResponse<PostView>> {
    guard_adult(
        &current.actor,
        Action::Create,
        ResourceKind::Posts,
        Utc::now().date_naive(),
    )?;
    ensure_title_free(&state, &req.title, None).await?;
    let category_ids = req.category_ids.unwrap_or_default();
    ensure_categories_exist(&state, &category_ids).await?;

    let new_post = NewPost {
        title: req.title,
        body: req.body,
        user_id: current.user.id,
        image: None,
    };
    let mut tx = state.db.begin().await?;
    let post = posts::insert(&mut *tx, &new_post).await?;
    posts::attach_categories(&mut *tx, post.id, &category_ids).await?;
    tx.commit().await?;

    info!(post_id = %post.id, user_id = %post.user_id, "Post created");
    Ok(ApiResponse::created(
        "Post created successfully",
        view(&state, post.id).await?,
    ))
}

pub async fn show(
    State(state): State<AppState>,
    current: CurrentActor,
    Path(id): Path<PostId>,
) -> ApiResult<ApiResponse<PostView>> {
    guard(&current.actor, Action::View, ResourceKind::Posts)?;
    Ok(ApiResponse::data(view(&state, id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    current: CurrentActor,
    Path(id): Path<PostId>,
    ValidatedJson(req): ValidatedJson<PostRequest>,
) -> ApiResult<ApiResponse<PostView>> {
    let post = find(&state, id).await?;
    guard_record(&current.actor, Action::Edit, ResourceKind::Posts, id.get(), post.user_id)?;

    let owner = match req.user_id.map(UserId::new) {
        Some(user_id) if user_id != post.user_id => {
            ensure_owner(&state, user_id).await?;
            user_id
        }
        _ => post.user_id,
    };
    ensure_title_free(&state, &req.title, Some(id)).await?;
    if let Some(ids) = &req.category_ids {
        ensure_categories_exist(&state, ids).await?;
    }

    let mut tx = state.db.begin().await?;
    posts::update_with_categories(
        &mut *tx,
        id,
        &req.title,
        &req.body,
        owner,
        req.category_ids.as_deref(),
    )
    .await?
    .not_found("Post")?;
    tx.commit().await?;

    info!(post_id = %id, "Post updated");
    Ok(ApiResponse::ok("Post updated successfully", view(&state, id).await?))
}

pub async fn destroy(
    State(state): State<AppState>,
    current: CurrentActor,
    Path(id): Path<PostId>,
) -> ApiResult<ApiResponse<()>> {
    let post = find(&state, id).await?;
    guard_record(&current.actor, Action::Delete, ResourceKind::Posts, id.get(), post.user_id)?;

    posts::delete(&state.db, id).await?;
    if let Some(image) = &post.image {
        if let Err(e) = state.storage.delete(image).await {
            warn!(post_id = %id, error = %e, "Failed to delete post image");
        }
    }

    info!(post_id = %id, "Post deleted");
    Ok(ApiResponse::message("Post deleted successfully"))
}

/// Replace the post image with the uploaded `image` part.
pub async fn upload_image(
    State(state): State<AppState>,
    current: CurrentActor,
    Path(id): Path<PostId>,
    multipart: Multipart,
) -> ApiResult<ApiResponse<PostView>> {
    let post = find(&state, id).await?;
    guard_record(&current.actor, Action::Edit, ResourceKind::Posts, id.get(), post.user_id)?;

    let upload = read_file(multipart, "image", MAX_IMAGE_BYTES).await?;
    let extension = check_image(&upload)?;
    let key = format!("posts/{}.{}", Uuid::new_v4(), extension);
    state.storage.put(&key, &upload.bytes).await?;

    if let Err(e) = posts::set_image(&state.db, id, Some(&key)).await {
        let _ = state.storage.delete(&key).await;
        return Err(e.into());
    }
    if let Some(old) = &post.image {
        if let Err(e) = state.storage.delete(old).await {
            warn!(post_id = %id, error = %e, "Failed to delete replaced image");
        }
    }

    info!(post_id = %id, key = %key, bytes = upload.bytes.len(), "Post image stored");
    Ok(ApiResponse::ok(
        "Image uploaded successfully",
        view(&state, id).await?,
    ))
}

pub async fn delete_image(
    State(state): State<AppState>,
    current: CurrentActor,
    Path(id): Path<PostId>,
) -> ApiResult<ApiResponse<PostView>> {
    let post = find(&state, id).await?;
    guard_record(&current.actor, Action::Edit, ResourceKind::Posts, id.get(), post.user_id)?;

    let Some(image) = &post.image else {
        return Err(ApiError::BadRequest("Post has no image".to_string()));
    };
    state.storage.delete(image).await?;
    posts::set_image(&state.db, id, None).await?;

    info!(post_id = %id, "Post image deleted");
    Ok(ApiResponse::ok(
        "Image deleted successfully",
        view(&state, id).await?,
    ))
}

pub async fn attach_categories(
    State(state): State<AppState>,
    current: CurrentActor,
    Path(id): Path<PostId>,
    ValidatedJson(req): ValidatedJson<CategoryIdsRequest>,
) -> ApiResult<ApiResponse<PostView>> {
    let post = find(&state, id).await?;
    guard_record(&current.actor, Action::Edit, ResourceKind::Posts, id.get(), post.user_id)?;
    ensure_categories_exist(&state, &req.category_ids).await?;

    posts::attach_categories(&state.db, id, &req.category_ids).await?;
    Ok(ApiResponse::ok(
        "Categories attached successfully",
        view(&state, id).await?,
    ))
}

pub async fn detach_categories(
    State(state): State<AppState>,
    current: CurrentActor,
    Path(id): Path<PostId>,
    ValidatedJson(req): ValidatedJson<CategoryIdsRequest>,
) -> ApiResult<ApiResponse<PostView>> {
    let post = find(&state, id).await?;
    guard_record(&current.actor, Action::Edit, ResourceKind::Posts, id.get(), post.user_id)?;
    ensure_categories_exist(&state, &req.category_ids).await?;

    posts::detach_categories(&state.db, id, &req.category_ids).await?;
    Ok(ApiResponse::ok(
        "Categories detached successfully",
        view(&state, id).await?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn upload(name: &str, content_type: Option<&str>) -> Upload {
        Upload {
            file_name: name.to_string(),
            content_type: content_type.map(str::to_string),
            bytes: Bytes::from_static(b"img"),
        }
    }

    #[test]
    fn test_check_image_accepts_listed_types() {
        assert_eq!(check_image(&upload("a.PNG", Some("image/png"))).unwrap(), "png");
        assert_eq!(check_image(&upload("a.webp", None)).unwrap(), "webp");
    }

    #[test]
    fn test_check_image_rejects_others() {
        assert!(check_image(&upload("a.svg", Some("image/svg+xml"))).is_err());
        assert!(check_image(&upload("a.png", Some("text/plain"))).is_err());
        assert!(check_image(&upload("a", None)).is_err());
    }
}
