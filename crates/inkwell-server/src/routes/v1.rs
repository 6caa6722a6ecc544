//! API v1 routes.

use crate::handlers::{auth, categories, exports, imports, posts, users};
use crate::middleware::{resolve_actor, AuthLayer, AuthzLayer};
use crate::state::AppState;
use axum::{
    middleware::from_fn_with_state,
    routing::{delete, get, post},
    Router,
};
use inkwell_policy::{Action, ResourceKind};

pub fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(public_routes())
        .merge(authenticated_routes(state))
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
}

/// Everything behind a bearer token. The token is checked first, then the
/// actor is loaded for the handlers and the authorization layers.
fn authenticated_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(auth_routes())
        .merge(post_routes())
        .merge(user_routes())
        .merge(category_routes())
        .merge(export_routes())
        .merge(import_routes())
        .route_layer(from_fn_with_state(state.clone(), resolve_actor))
        .route_layer(AuthLayer::new(state.config.auth.jwt_secret.clone()))
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        .route("/auth/change-password", post(auth::change_password))
        .route(
            "/auth/assign-role",
            post(auth::assign_role).layer(AuthzLayer::manage(ResourceKind::Roles)),
        )
        .route(
            "/auth/remove-role",
            post(auth::remove_role).layer(AuthzLayer::manage(ResourceKind::Roles)),
        )
        .route("/auth/users/:id/roles", get(auth::user_roles))
        .route("/auth/check-permission", post(auth::check_permission))
}

fn post_routes() -> Router<AppState> {
    Router::new()
        .route("/posts", get(posts::index).post(posts::store))
        .route(
            "/posts/:id",
            get(posts::show).put(posts::update).delete(posts::destroy),
        )
        .route(
            "/posts/:id/image",
            post(posts::upload_image).delete(posts::delete_image),
        )
        .route("/posts/:id/categories/attach", post(posts::attach_categories))
        .route("/posts/:id/categories/detach", post(posts::detach_categories))
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(users::index).post(users::store))
        .route(
            "/users/:id",
            get(users::show).put(users::update).delete(users::destroy),
        )
        .route("/users/:id/posts", get(users::posts))
}

fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(categories::index).post(categories::store))
        .route(
            "/categories/:id",
            get(categories::show)
                .put(categories::update)
                .delete(categories::destroy),
        )
        .route("/categories/:id/posts", get(categories::posts))
}

fn export_routes() -> Router<AppState> {
    Router::new()
        .route("/exports/users/pdf", post(exports::users_pdf))
        .route("/exports/users/excel", post(exports::users_excel))
        .route("/exports/posts/pdf", post(exports::posts_pdf))
        .route("/exports/posts/excel", post(exports::posts_excel))
        .route(
            "/exports/:id",
            delete(exports::destroy).layer(AuthzLayer::new(Action::Delete, ResourceKind::Exports)),
        )
}

fn import_routes() -> Router<AppState> {
    Router::new()
        .route("/imports/users", post(imports::users))
        .route("/imports/posts", post(imports::posts))
        .route("/imports/templates/users", get(imports::users_template))
        .route("/imports/templates/posts", get(imports::posts_template))
}
