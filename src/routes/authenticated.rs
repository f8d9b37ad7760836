use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{delete, get, patch},
};

/// Authenticated Router Module
///
/// Routes that need a valid bearer token but no particular role. The token is
/// verified by the `require_token` route layer installed in `create_router`, which
/// also makes the decoded claims available to handlers through `AuthUser`.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /users/admin/{id}
        // The segment is the caller's own email; asking about anyone else is a 403.
        .route("/users/admin/{id}", get(handlers::check_admin))
        // GET /pets
        // Every pet, for the dashboard.
        .route("/pets", get(handlers::list_pets))
        .route("/pet/{id}", delete(handlers::delete_pet))
        // --- Adoption Workflow ---
        .route("/adoption/{id}", delete(handlers::delete_adoption))
        // PATCH /adoption/adopted/{id}
        // Flags the pet itself as adopted.
        .route("/adoption/adopted/{id}", patch(handlers::mark_pet_adopted))
        // PATCH /reqAdoption/reqAdopted/{id}
        // Flags the adoption request as accepted.
        .route(
            "/reqAdoption/reqAdopted/{id}",
            patch(handlers::mark_adoption_accepted),
        )
}
