//! Registration, login, tokens and role management.

use crate::db::repo::{roles, tokens, users};
use crate::error::{ApiError, ApiResult};
use crate::middleware::auth::{encode_token, Auth, Claims, CurrentActor};
use crate::request::{
    birth_date, ChangePasswordRequest, CheckPermissionRequest, LoginRequest, RegisterRequest,
    RoleAssignmentRequest, ValidatedJson,
};
use crate::response::ApiResponse;
use crate::state::AppState;
use axum::extract::{Path, State};
use chrono::{DateTime, Utc};
use inkwell_domain::{age_on, hash_password, verify_password, NewUser, User, UserId};
use inkwell_policy::MEMBER_ROLE;
use serde::Serialize;
use tracing::info;

/// A user with the names of its roles and permissions.
#[derive(Debug, Serialize)]
pub struct UserAccess {
    pub user: User,
    pub roles: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub user: User,
    pub roles: Vec<String>,
    pub permissions: Vec<String>,
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

#[derive(Debug, Serialize)]
pub struct PermissionCheck {
    pub user_id: UserId,
    pub user_name: String,
    pub permission: String,
    pub has_permission: bool,
}

pub(crate) fn age_today(date_of_birth: Option<chrono::NaiveDate>) -> Option<i32> {
    date_of_birth
        .and_then(|dob| age_on(dob, Utc::now().date_naive()))
        .map(|age| age as i32)
}

async fn access_of(state: &AppState, user: User, with_permissions: bool) -> ApiResult<UserAccess> {
    let role_names = roles::roles_of(&state.db, user.id).await?;
    let permissions =
        with_permissions.then(|| state.roles.permissions_for(&role_names).names());
    Ok(UserAccess {
        user,
        roles: role_names,
        permissions,
    })
}

fn issue_token(state: &AppState, access: UserAccess) -> ApiResult<TokenResponse> {
    let expires_in = state.config.auth.access_token_expiry_secs;
    let claims = Claims::new_access(
        access.user.id,
        &access.user.email,
        access.roles.clone(),
        expires_in,
    );
    let access_token = encode_token(&claims, &state.config.auth.jwt_secret)?;
    Ok(TokenResponse {
        user: access.user,
        roles: access.roles,
        permissions: access.permissions.unwrap_or_default(),
        access_token,
        token_type: "Bearer",
        expires_in,
    })
}

/// Resolve a user id from a request body, reporting an unknown one as a
/// field error.
async fn existing_user(state: &AppState, user_id: i64) -> ApiResult<User> {
    users::find_by_id(&state.db, UserId::new(user_id))
        .await?
        .ok_or_else(|| ApiError::field("user_id", "The selected user id is invalid."))
}

async fn existing_role(state: &AppState, role: &str) -> ApiResult<()> {
    if roles::exists(&state.db, role).await? {
        Ok(())
    } else {
        Err(ApiError::field("role", "The selected role is invalid."))
    }
}

pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> ApiResult<ApiResponse<TokenResponse>> {
    if users::email_taken(&state.db, &req.email, None).await? {
        return Err(ApiError::field("email", "The email has already been taken."));
    }
    if users::mobile_taken(&state.db, &req.mobile_number, None).await? {
        return Err(ApiError::field(
            "mobile_number",
            "The mobile number has already been taken.",
        ));
    }

    let date_of_birth = birth_date(&req.date_of_birth);
    let new_user = NewUser {
        name: req.name,
        email: req.email,
        mobile_number: req.mobile_number,
        address: req.address,
        date_of_birth,
        age: age_today(date_of_birth),
        password_hash: hash_password(&req.password)?,
    };

    let mut tx = state.db.begin().await?;
    let user = users::insert(&mut *tx, &new_user).await?;
    roles::assign(&mut *tx, user.id, MEMBER_ROLE).await?;
    tx.commit().await?;

    info!(user_id = %user.id, "User registered");
    let access = access_of(&state, user, true).await?;
    Ok(ApiResponse::created(
        "User registered successfully",
        issue_token(&state, access)?,
    ))
}

pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> ApiResult<ApiResponse<TokenResponse>> {
    let user = users::find_by_email(&state.db, &req.email)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;
    if !verify_password(&req.password, &user.password_hash)? {
        return Err(ApiError::InvalidCredentials);
    }

    info!(user_id = %user.id, "User logged in");
    let access = access_of(&state, user, true).await?;
    Ok(ApiResponse::ok("Login successful", issue_token(&state, access)?))
}

pub async fn logout(
    State(state): State<AppState>,
    Auth(auth): Auth,
) -> ApiResult<ApiResponse<()>> {
    let expires_at = DateTime::<Utc>::from_timestamp(auth.claims.exp, 0).unwrap_or_else(Utc::now);
    tokens::revoke(&state.db, auth.jti(), auth.id, expires_at).await?;
    info!(user_id = %auth.id, "Token revoked");
    Ok(ApiResponse::message("Logged out successfully"))
}

pub async fn me(current: CurrentActor) -> ApiResponse<UserAccess> {
    ApiResponse::data(UserAccess {
        roles: current.actor.roles().to_vec(),
        permissions: Some(current.actor.permissions().names()),
        user: current.user,
    })
}

pub async fn change_password(
    State(state): State<AppState>,
    current: CurrentActor,
    ValidatedJson(req): ValidatedJson<ChangePasswordRequest>,
) -> ApiResult<ApiResponse<()>> {
    if !verify_password(&req.current_password, &current.user.password_hash)? {
        return Err(ApiError::IncorrectPassword);
    }
    users::update_password(&state.db, current.user.id, &hash_password(&req.new_password)?).await?;
    info!(user_id = %current.user.id, "Password changed");
    Ok(ApiResponse::message("Password changed successfully"))
}

/// Replace every role of the user with the requested one.
pub async fn assign_role(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RoleAssignmentRequest>,
) -> ApiResult<ApiResponse<UserAccess>> {
    let user = existing_user(&state, req.user_id).await?;
    existing_role(&state, &req.role).await?;

    roles::sync(&state.db, user.id, &req.role).await?;
    info!(user_id = %user.id, role = %req.role, "Role assigned");
    Ok(ApiResponse::ok(
        "Role assigned successfully",
        access_of(&state, user, true).await?,
    ))
}

pub async fn remove_role(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RoleAssignmentRequest>,
) -> ApiResult<ApiResponse<UserAccess>> {
    let user = existing_user(&state, req.user_id).await?;
    existing_role(&state, &req.role).await?;

    roles::remove(&state.db, user.id, &req.role).await?;
    info!(user_id = %user.id, role = %req.role, "Role removed");
    Ok(ApiResponse::ok(
        "Role removed successfully",
        access_of(&state, user, false).await?,
    ))
}

pub async fn user_roles(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> ApiResult<ApiResponse<UserAccess>> {
    let user = users::find_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("User"))?;
    Ok(ApiResponse::data(access_of(&state, user, true).await?))
}

pub async fn check_permission(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CheckPermissionRequest>,
) -> ApiResult<ApiResponse<PermissionCheck>> {
    let user = existing_user(&state, req.user_id).await?;
    let role_names = roles::roles_of(&state.db, user.id).await?;
    let actor = state.roles.resolve(user.id, role_names, user.date_of_birth);

    Ok(ApiResponse::data(PermissionCheck {
        user_id: user.id,
        user_name: user.name,
        has_permission: actor.permissions().contains_name(&req.permission),
        permission: req.permission,
    }))
}
