//! Resolves the authenticated caller into an [`Actor`] on every request.

use super::auth::AuthUser;
use crate::db::repo::{roles, tokens, users};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use inkwell_domain::User;
use inkwell_policy::Actor;
use tracing::debug;

/// Look up the token subject, reject revoked tokens and expand the stored
/// roles into permissions. Inserts [`Actor`] and [`User`] extensions.
pub async fn resolve_actor(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let Some(auth) = req.extensions().get::<AuthUser>().cloned() else {
        return ApiError::Unauthorized.into_response();
    };

    match load_actor(&state, &auth).await {
        Ok((actor, user)) => {
            debug!(user_id = %actor.id(), roles = ?actor.roles(), "Actor resolved");
            req.extensions_mut().insert(actor);
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        Err(err) => err.into_response(),
    }
}

async fn load_actor(state: &AppState, auth: &AuthUser) -> ApiResult<(Actor, User)> {
    if tokens::is_revoked(&state.db, auth.jti()).await? {
        return Err(ApiError::TokenRevoked);
    }

    let user = users::find_by_id(&state.db, auth.id)
        .await?
        .ok_or(ApiError::NotFound("User"))?;
    let role_names = roles::roles_of(&state.db, user.id).await?;
    let actor = state.roles.resolve(user.id, role_names, user.date_of_birth);

    Ok((actor, user))
}
