use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, patch},
};

/// Admin Router Module
///
/// Routes restricted to users whose stored role is "admin". `create_router` wraps
/// this router in `require_admin` inside `require_token`, so the role lookup always
/// sees verified claims.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /users
        // Every registered user, for the admin user table.
        .route("/users", get(handlers::list_users))
        // PATCH /users/admin/{id}
        // Promotes the user with this ObjectId to admin.
        .route("/users/admin/{id}", patch(handlers::make_admin))
}
