//! Category CRUD.

use crate::db::repo::{
    categories,
    posts::{self, PostView, ViewFilter},
};
use crate::error::{ApiError, ApiResult, ErrorContext};
use crate::request::{CategoryRequest, ValidatedJson};
use crate::response::ApiResponse;
use crate::state::AppState;
use axum::extract::{Path, State};
use inkwell_domain::{Category, CategoryId};
use serde::Serialize;
use tracing::info;

#[derive(Debug, Serialize)]
pub struct CategoryPosts {
    pub category: Category,
    pub posts: Vec<PostView>,
}

async fn find(state: &AppState, id: CategoryId) -> ApiResult<Category> {
    categories::find_by_id(&state.db, id)
        .await?
        .not_found("Category")
}

fn name_taken() -> ApiError {
    ApiError::field("name", "The name has already been taken.")
}

pub async fn index(State(state): State<AppState>) -> ApiResult<ApiResponse<Vec<Category>>> {
    Ok(ApiResponse::ok(
        "Categories retrieved successfully",
        categories::list(&state.db).await?,
    ))
}

pub async fn store(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CategoryRequest>,
) -> ApiResult<ApiResponse<Category>> {
    let category = categories::insert(&state.db, req.name.trim())
        .await
        .map_err(|e| match ApiError::from(e) {
            ApiError::DuplicateEntry(_) => name_taken(),
            other => other,
        })?;
    info!(category_id = %category.id, "Category created");
    Ok(ApiResponse::created("Category created successfully", category))
}

pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
) -> ApiResult<ApiResponse<Category>> {
    Ok(ApiResponse::ok(
        "Category retrieved successfully",
        find(&state, id).await?,
    ))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
    ValidatedJson(req): ValidatedJson<CategoryRequest>,
) -> ApiResult<ApiResponse<Category>> {
    let category = categories::rename(&state.db, id, req.name.trim())
        .await
        .map_err(|e| match ApiError::from(e) {
            ApiError::DuplicateEntry(_) => name_taken(),
            other => other,
        })?
        .not_found("Category")?;
    info!(category_id = %id, "Category updated");
    Ok(ApiResponse::ok("Category updated successfully", category))
}

pub async fn destroy(
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
) -> ApiResult<ApiResponse<()>> {
    if !categories::delete(&state.db, id).await? {
        return Err(ApiError::NotFound("Category"));
    }
    info!(category_id = %id, "Category deleted");
    Ok(ApiResponse::message("Category deleted successfully"))
}

pub async fn posts(
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
) -> ApiResult<ApiResponse<CategoryPosts>> {
    let category = find(&state, id).await?;
    let posts = posts::views(&state.db, ViewFilter::Category(id)).await?;
    Ok(ApiResponse::ok(
        "Category posts retrieved successfully",
        CategoryPosts { category, posts },
    ))
}
