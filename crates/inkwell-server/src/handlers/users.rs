//! User CRUD.

use super::auth::age_today;
use crate::db::repo::{
    posts::{self, PostView, ViewFilter},
    roles, users,
};
use crate::error::{ApiError, ApiResult, ErrorContext};
use crate::request::{birth_date, CreateUserRequest, UpdateUserRequest, ValidatedJson};
use crate::response::ApiResponse;
use crate::state::AppState;
use axum::extract::{Path, State};
use inkwell_domain::{hash_password, NewUser, User, UserId};
use inkwell_policy::MEMBER_ROLE;
use serde::Serialize;
use tracing::info;

#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: UserId,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct UserPosts {
    pub user: UserSummary,
    pub posts: Vec<PostView>,
}

async fn find(state: &AppState, id: UserId) -> ApiResult<User> {
    users::find_by_id(&state.db, id)
        .await?
        .not_found("User")
}

async fn ensure_unique(
    state: &AppState,
    email: Option<&str>,
    mobile_number: &str,
    except: Option<UserId>,
) -> ApiResult<()> {
    if let Some(email) = email {
        if users::email_taken(&state.db, email, except).await? {
            return Err(ApiError::field("email", "The email has already been taken."));
        }
    }
    if users::mobile_taken(&state.db, mobile_number, except).await? {
        return Err(ApiError::field(
            "mobile_number",
            "The mobile number has already been taken.",
        ));
    }
    Ok(())
}

pub async fn index(State(state): State<AppState>) -> ApiResult<ApiResponse<Vec<User>>> {
    Ok(ApiResponse::ok(
        "Users retrieved successfully",
        users::list(&state.db).await?,
    ))
}

/// Create an account. Without a password the import default is used.
pub async fn store(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateUserRequest>,
) -> ApiResult<ApiResponse<User>> {
    ensure_unique(&state, Some(&req.email), &req.mobile_number, None).await?;

    let password = req
        .password
        .as_deref()
        .unwrap_or(&state.config.import.default_password);
    let date_of_birth = birth_date(&req.date_of_birth);
    let new_user = NewUser {
        name: req.name,
        email: req.email,
        mobile_number: req.mobile_number,
        address: req.address,
        date_of_birth,
        age: age_today(date_of_birth),
        password_hash: hash_password(password)?,
    };

    let mut tx = state.db.begin().await?;
    let user = users::insert(&mut *tx, &new_user).await?;
    roles::assign(&mut *tx, user.id, MEMBER_ROLE).await?;
    tx.commit().await?;

    info!(user_id = %user.id, "User created");
    Ok(ApiResponse::created("User created successfully", user))
}

pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> ApiResult<ApiResponse<User>> {
    Ok(ApiResponse::ok(
        "User retrieved successfully",
        find(&state, id).await?,
    ))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
    ValidatedJson(req): ValidatedJson<UpdateUserRequest>,
) -> ApiResult<ApiResponse<User>> {
    find(&state, id).await?;
    ensure_unique(&state, req.email.as_deref(), &req.mobile_number, Some(id)).await?;

    let date_of_birth = birth_date(&req.date_of_birth);
    let changes = users::UserChanges {
        name: req.name,
        email: req.email,
        mobile_number: req.mobile_number,
        address: req.address,
        date_of_birth,
        age: age_today(date_of_birth),
    };
    let user = users::update(&state.db, id, &changes)
        .await?
        .not_found("User")?;

    info!(user_id = %id, "User updated");
    Ok(ApiResponse::ok("User updated successfully", user))
}

pub async fn destroy(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> ApiResult<ApiResponse<()>> {
    if !users::delete(&state.db, id).await? {
        return Err(ApiError::NotFound("User"));
    }
    info!(user_id = %id, "User deleted");
    Ok(ApiResponse::message("User deleted successfully"))
}

pub async fn posts(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> ApiResult<ApiResponse<UserPosts>> {
    let user = find(&state, id).await?;
    let posts = posts::views(&state.db, ViewFilter::Author(id)).await?;
    Ok(ApiResponse::ok(
        "User posts retrieved successfully",
        UserPosts {
            user: UserSummary {
                id: user.id,
                name: user.name,
            },
            posts,
        },
    ))
}
